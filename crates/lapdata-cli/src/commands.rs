//! Subcommand implementations

use crate::config::CliConfig;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use lapdata_graph::{MemoryGraph, ObjectId};
use lapdata_model::{
    record_from_json, record_to_json, LapModel, ModelSettings, Progress, StoreOptions,
};
use std::io::{self, Read};
use std::path::Path;

/// Prints write checkpoints to stderr.
struct StderrProgress {
    maximum: usize,
}

impl Progress for StderrProgress {
    fn show(&mut self, label: &str) {
        eprintln!("{}", label.cyan());
    }

    fn update_state(&mut self, value: usize, maximum: Option<usize>) {
        if let Some(maximum) = maximum {
            self.maximum = maximum;
        }
        eprintln!("  [{value}/{}]", self.maximum);
    }
}

pub struct Session {
    pub config: CliConfig,
    pub model: LapModel,
    pub store: MemoryGraph,
}

impl Session {
    /// Open the snapshot (or start an empty graph) and apply the settings.
    pub fn open(config: CliConfig) -> Result<Self> {
        let store = if config.db.exists() {
            MemoryGraph::open(&config.db)?
        } else {
            tracing::info!(path = %config.db.display(), "snapshot not found; starting empty graph");
            MemoryGraph::new()
        };

        let mut model = LapModel::new();
        if let Some(path) = &config.settings {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read settings {}", path.display()))?;
            let settings = ModelSettings::from_json_str(&text)
                .with_context(|| format!("invalid settings {}", path.display()))?;
            model.apply_settings(settings);
        }

        Ok(Self {
            config,
            model,
            store,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.config.db)
    }
}

pub fn cmd_schema(session: &mut Session) -> Result<()> {
    let schema = session.model.create_data_structure(&mut session.store)?;
    let structure = session
        .model
        .data_structure(&session.store, lapdata_model::SchemaScope::Full);
    session.save()?;

    println!("{}", "Classes".bold());
    for class in &structure.classes {
        println!("  {class}");
    }
    println!("{}", "Descriptors".bold());
    for (name, (class, descriptor)) in &schema.descr_lookup {
        println!("  {} -> {}.{}", name.green(), class, descriptor);
    }
    println!("{}", "Relations".bold());
    for edge in &schema.relations {
        println!("  {edge}");
    }
    Ok(())
}

fn read_record_source(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read record {}", source.display()))
}

pub fn cmd_store(
    session: &mut Session,
    source: &Path,
    id: Option<u32>,
    keep_default: bool,
) -> Result<()> {
    let json: serde_json::Value = serde_json::from_str(&read_record_source(source)?)
        .context("record is not valid JSON")?;
    let record = record_from_json(&json)?;

    let options = StoreOptions {
        keep_default: keep_default || session.config.keep_default,
        silent: false,
    };
    let mut progress = StderrProgress { maximum: 0 };
    let outcome = session.model.store_data(
        &mut session.store,
        &record,
        id.map(ObjectId::new),
        options,
        Some(&mut progress as &mut dyn Progress),
    )?;
    session.save()?;

    eprintln!(
        "{} object {} ({} added, {} changed, {} deleted)",
        "stored".green().bold(),
        outcome.root.to_string().bold(),
        outcome.added.len(),
        outcome.changed.len(),
        outcome.deleted.len(),
    );
    println!("{}", outcome.root);
    Ok(())
}

pub fn cmd_load(session: &Session, id: u32) -> Result<()> {
    let record = session.model.load_data(&session.store, ObjectId::new(id))?;
    println!("{}", serde_json::to_string_pretty(&record_to_json(&record))?);
    Ok(())
}

pub fn cmd_delete(session: &mut Session, ids: &[u32]) -> Result<()> {
    let ids: Vec<ObjectId> = ids.iter().copied().map(ObjectId::new).collect();
    let outcome = session.model.delete_drawings(&mut session.store, &ids)?;
    session.save()?;

    eprintln!(
        "{} {} objects ({} unlinked)",
        "deleted".green().bold(),
        outcome.deleted.len(),
        outcome.changed.len(),
    );
    Ok(())
}

pub fn cmd_find(session: &Session, sample_id: &str) -> Result<()> {
    match session.model.find_sample_id(&session.store, sample_id) {
        Some(id) => {
            println!("{id}");
            Ok(())
        }
        None => Err(anyhow!("no sample with id `{}`", sample_id.trim())),
    }
}

pub fn cmd_values(session: &Session) -> Result<()> {
    for (name, values) in session.model.descriptor_values(&session.store) {
        if values.is_empty() {
            continue;
        }
        println!("{}: {}", name.bold(), values.join(", "));
    }
    Ok(())
}

//! Chain expressions
//!
//! A chain names where a descriptor lives in the graph:
//! - `Class.Descriptor`
//! - `Class.Relation.Class.Descriptor`
//!
//! `[...]` spans are literal: dots inside them do not split, and the brackets
//! themselves are dropped. Spans do not nest; the first `]` closes. A `[`
//! with no later `]` is an ordinary character.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Chain {
    Direct {
        class: String,
        descriptor: String,
    },
    Indirect {
        class: String,
        relation: String,
        target: String,
        descriptor: String,
    },
    /// Any fragment count other than 2 or 4.
    Invalid,
}

impl Chain {
    pub fn parse(chain: &str) -> Self {
        let mut fragments = split_fragments(chain).into_iter();
        match fragments.len() {
            2 => {
                let (Some(class), Some(descriptor)) = (fragments.next(), fragments.next()) else {
                    return Self::Invalid;
                };
                Self::Direct { class, descriptor }
            }
            4 => {
                let (Some(class), Some(relation), Some(target), Some(descriptor)) = (
                    fragments.next(),
                    fragments.next(),
                    fragments.next(),
                    fragments.next(),
                ) else {
                    return Self::Invalid;
                };
                Self::Indirect {
                    class,
                    relation,
                    target,
                    descriptor,
                }
            }
            _ => Self::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// `(class, descriptor)` holding the value: the far class for indirect
    /// chains.
    pub fn data_location(&self) -> Option<(&str, &str)> {
        match self {
            Self::Direct { class, descriptor } => Some((class, descriptor)),
            Self::Indirect {
                target, descriptor, ..
            } => Some((target, descriptor)),
            Self::Invalid => None,
        }
    }
}

pub fn parse_chain(chain: &str) -> Chain {
    Chain::parse(chain)
}

fn split_fragments(chain: &str) -> Vec<String> {
    let chars: Vec<char> = chain.chars().collect();
    let mut fragments = Vec::new();
    let mut current = String::new();

    let mut i = 0usize;
    while i < chars.len() {
        match chars[i] {
            '[' => {
                if let Some(len) = chars[i + 1..].iter().position(|c| *c == ']') {
                    current.extend(&chars[i + 1..i + 1 + len]);
                    i += len + 2;
                    continue;
                }
                current.push('[');
            }
            '.' => fragments.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
        i += 1;
    }
    fragments.push(current);
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(class: &str, descriptor: &str) -> Chain {
        Chain::Direct {
            class: class.to_string(),
            descriptor: descriptor.to_string(),
        }
    }

    #[test]
    fn two_fragments_are_direct() {
        assert_eq!(parse_chain("Sample.Id"), direct("Sample", "Id"));
    }

    #[test]
    fn four_fragments_are_indirect() {
        assert_eq!(
            parse_chain("Sample.Drawn.Detail.Geometry"),
            Chain::Indirect {
                class: "Sample".to_string(),
                relation: "Drawn".to_string(),
                target: "Detail".to_string(),
                descriptor: "Geometry".to_string(),
            }
        );
    }

    #[test]
    fn bracketed_dot_is_not_a_split_point() {
        assert_eq!(parse_chain("A[.].B"), direct("A.", "B"));
        assert_eq!(parse_chain("[Area 1.2].[Max. depth]"), direct("Area 1.2", "Max. depth"));
        assert_eq!(
            parse_chain("S.[has.part].P.D"),
            Chain::Indirect {
                class: "S".to_string(),
                relation: "has.part".to_string(),
                target: "P".to_string(),
                descriptor: "D".to_string(),
            }
        );
    }

    #[test]
    fn other_fragment_counts_are_invalid() {
        assert_eq!(parse_chain("A.B.C"), Chain::Invalid);
        assert_eq!(parse_chain("A"), Chain::Invalid);
        assert_eq!(parse_chain("A.B.C.D.E"), Chain::Invalid);
        assert!(!parse_chain("").is_valid());
    }

    #[test]
    fn unmatched_bracket_is_literal() {
        assert_eq!(parse_chain("A[x.B"), direct("A[x", "B"));
    }

    #[test]
    fn data_location_uses_far_class() {
        assert_eq!(
            parse_chain("Sample.Drawn.Detail.Geometry").data_location(),
            Some(("Detail", "Geometry"))
        );
        assert_eq!(parse_chain("Sample.Id").data_location(), Some(("Sample", "Id")));
        assert_eq!(parse_chain("x").data_location(), None);
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{ArchitectureNode, ChecklistQuestion};

/// Sibling ordering applied to every level of a built tree.
pub trait NodeOrdering {
    fn compare(&self, a: &ArchitectureNode, b: &ArchitectureNode) -> Ordering;
}

impl<F> NodeOrdering for F
where
    F: Fn(&ArchitectureNode, &ArchitectureNode) -> Ordering,
{
    fn compare(&self, a: &ArchitectureNode, b: &ArchitectureNode) -> Ordering {
        self(a, b)
    }
}

/// `1.2` < `1.10` < `2`: numeric per segment where both sides are numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalCodeOrder;

impl NodeOrdering for NaturalCodeOrder {
    fn compare(&self, a: &ArchitectureNode, b: &ArchitectureNode) -> Ordering {
        compare_codes(&a.code, &b.code)
    }
}

pub fn compare_codes(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x_num), Ok(y_num)) => x_num.cmp(&y_num).then_with(|| x.cmp(y)),
                    _ => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Ranks codes by a registered evaluation-section order.
///
/// Registered codes come first, in registration order. Anything unregistered
/// sorts after them in natural code order.
#[derive(Debug, Clone, Default)]
pub struct SectionOrder {
    ranks: HashMap<String, usize>,
}

impl SectionOrder {
    pub fn new<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ranks = HashMap::new();
        for section in sections {
            let next_rank = ranks.len();
            ranks.entry(section.into()).or_insert(next_rank);
        }
        Self { ranks }
    }

    pub fn rank(&self, code: &str) -> Option<usize> {
        self.ranks.get(code).copied()
    }

    pub fn compare_sections(&self, a: &str, b: &str) -> Ordering {
        match (self.rank(a), self.rank(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_codes(a, b),
        }
    }

    /// Stable: questions within one section keep their relative order.
    pub fn sort_questions(&self, questions: &mut [ChecklistQuestion]) {
        questions.sort_by(|a, b| self.compare_sections(&a.evaluation_section, &b.evaluation_section));
    }
}

impl NodeOrdering for SectionOrder {
    fn compare(&self, a: &ArchitectureNode, b: &ArchitectureNode) -> Ordering {
        self.compare_sections(&a.code, &b.code)
    }
}

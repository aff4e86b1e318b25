use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistQuestion {
    pub question_id: String,
    pub evaluation_section: String,
    #[serde(default)]
    pub question: String,
}

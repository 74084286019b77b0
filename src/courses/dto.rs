use serde::{Deserialize, Serialize};

use crate::courses::repo::{Course, Hole, Tee};

#[derive(Debug, Serialize)]
pub struct TeeWithHoles {
    #[serde(flatten)]
    pub tee: Tee,
    pub holes: Vec<Hole>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetails {
    #[serde(flatten)]
    pub course: Course,
    pub tees: Vec<TeeWithHoles>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
}

pub mod analysis;

pub use analysis::{AnalysisResult, ApiEnvelope, PersonalInfo, RawAnalysis, Tag, TagCategory};

pub mod error;
pub mod report;
pub mod utils;

pub use error::{PipelineError, Result};
pub use report::{
    AggregateSentimentReport, CategoryResult, ModelsUsed, RunReport, SentimentDistribution,
    SentimentLabel, SentimentPercentages, SentimentResult, SummaryResult, TextUnit,
};

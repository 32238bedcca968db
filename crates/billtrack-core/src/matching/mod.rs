pub mod approval;
pub mod matcher;
pub mod policy;
pub mod similarity;

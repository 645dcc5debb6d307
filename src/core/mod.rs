pub mod diagnosis;
pub mod extractor;
pub mod inquiry;
pub mod predictor;
pub mod translator;

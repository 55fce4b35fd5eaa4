pub mod u501_survey_address;
pub mod u502_survey_launch;
pub mod u503_row_with_survey;

pub mod u501_survey_address;
pub mod u502_survey_launch;

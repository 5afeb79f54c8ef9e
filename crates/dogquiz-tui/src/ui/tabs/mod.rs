pub mod breeds;
pub mod quiz;

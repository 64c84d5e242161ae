pub mod areas;
pub mod backup;
pub mod csv;
pub mod health;
pub mod spots;

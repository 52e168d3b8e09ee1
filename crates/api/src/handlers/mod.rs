pub mod admin;
pub mod adoption;
pub mod badges;
pub mod points;

pub mod amounts;
pub mod columns;
pub mod currency;
pub mod dates;

pub mod k401;

pub mod earthmc;

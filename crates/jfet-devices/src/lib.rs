pub mod jfet;

pub mod ayna;

pub mod pix_key_reader;

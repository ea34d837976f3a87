pub mod gradebook_api;

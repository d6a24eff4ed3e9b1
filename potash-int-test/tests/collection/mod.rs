mod collection_test;
mod find_test;
mod index_test;
mod text_index_test;

mod transaction_collection_test;
mod transaction_repository_test;

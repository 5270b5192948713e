mod test_concurrent_joins;

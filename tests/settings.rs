use super::*;

#[test]
#[timeout(30000)]
fn missing_pool_address() {
    CommandBuilder::new("miner --username alice").expect_failure("no pool address configured");
}

#[test]
#[timeout(30000)]
fn missing_username() {
    CommandBuilder::new("miner --pool-address 127.0.0.1:3333")
        .expect_failure("no user name configured");
}

#[test]
#[timeout(30000)]
fn missing_explicit_config_file() {
    CommandBuilder::new("--config nope.json miner").expect_failure("does not exist");
}

#[test]
#[timeout(30000)]
fn malformed_config_file() {
    CommandBuilder::new("miner")
        .write("config.json", r#"{"pool_port": "not a port"}"#)
        .expect_failure("failed to deserialize config file");
}

#[test]
#[timeout(30000)]
fn malformed_environment_variable() {
    CommandBuilder::new("miner")
        .env("SHOVEL_POOL_PORT", "lots")
        .expect_failure("failed to parse environment variable SHOVEL_POOL_PORT");
}

#[test]
#[timeout(30000)]
fn invalid_share_factor() {
    CommandBuilder::new("miner --pool-address 127.0.0.1:3333 --username alice --share-factor 0")
        .expect_failure("share_factor must be a positive number");
}

#[test]
#[timeout(30000)]
fn rpc_without_credentials() {
    CommandBuilder::new("template --pool-address 127.0.0.1")
        .expect_failure("RPC mode requires an RPC user and password");
}

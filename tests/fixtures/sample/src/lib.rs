//! Sample crate

pub struct Config {
    pub name: String,
}

pub fn parse(input: &str) -> Config {
    Config { name: input.to_string() }
}

fn private_helper() {}

/// Protocol modules for the Scatter mint SDK
/// `scatter` wraps the minting SaaS API, `evm` the chain the collection lives on
pub mod evm;
pub mod scatter;

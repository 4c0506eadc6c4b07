mod cluster;
mod discovery;
mod objects;

pub use cluster::{ConnectError, KubeCluster};

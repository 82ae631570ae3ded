use diesel_async::pooled_connection::deadpool;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("failed to build the connection pool: {0}")]
    PoolBuild(#[from] deadpool::BuildError),
    #[error("could not check out a connection: {0}")]
    Pool(#[from] deadpool::PoolError),
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

use crate::resolver::Resolver;
use crate::table::SharedTable;
use crate::upstream::DynUpstream;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use trust_dns_proto::op::{OpCode, Query};
use trust_dns_proto::rr::Record;

/// Decides the answer section for one inbound message: a local answer when the
/// [`Resolver`] has one, otherwise the answers of the first recursor that replies.
pub struct Dispatcher {
    resolver: Resolver,
    recursors: Vec<SocketAddr>,
    upstream: DynUpstream,
}

impl Dispatcher {
    #[must_use]
    pub fn new(table: Arc<SharedTable>, recursors: Vec<SocketAddr>, upstream: DynUpstream) -> Self {
        Dispatcher {
            resolver: Resolver::new(table),
            recursors,
            upstream,
        }
    }

    #[must_use]
    pub fn recursion_available(&self) -> bool {
        !self.recursors.is_empty()
    }

    /// Produce the answer section for a message with the given opcode and questions.
    ///
    /// Never fails: anything that can't be answered ends up as an empty answer section.
    pub async fn dispatch(&self, op_code: OpCode, queries: &[Query]) -> Vec<Record> {
        if op_code != OpCode::Query {
            info!(?op_code, "query for unsupported opcode");
            return Vec::new();
        }

        match self.resolver.answer(queries) {
            Ok(answers) => answers,
            Err(err) if err.recursable() => {
                debug!(%err, "couldn't answer right away");
                self.recurse(queries).await
            }
            Err(err) => {
                error!(%err, "couldn't answer query");
                Vec::new()
            }
        }
    }

    async fn recurse(&self, queries: &[Query]) -> Vec<Record> {
        let Some(query) = queries.first() else {
            return Vec::new();
        };
        debug!(recursors = ?self.recursors, "recursing");
        for &server in &self.recursors {
            match self.upstream.forward(server, query).await {
                Ok(reply) => return reply.answers().to_vec(),
                Err(err) => error!(%server, error = ?err, "errored recursing"),
            }
        }
        warn!(query = %query.name(), "no recursor answered");
        Vec::new()
    }
}

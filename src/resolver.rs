//! Local answers for `A` and `NS` queries.

use crate::domain::{Domain, SEPARATOR};
use crate::error::Error;
use crate::table::SharedTable;
use std::borrow::Cow;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, error};
use trust_dns_proto::op::Query;
use trust_dns_proto::rr::{Name, RData, Record, RecordType};

/// TTL of locally built answer records.
pub const ANSWER_TTL: u32 = 3600;

/// Answers queries from a [`SharedTable`].
#[derive(Debug, Clone)]
pub struct Resolver {
    table: Arc<SharedTable>,
}

impl Resolver {
    #[must_use]
    pub fn new(table: Arc<SharedTable>) -> Self {
        Resolver { table }
    }

    /// Answer the first of `queries`. Any further questions are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoQuestions`] when `queries` is empty, [`Error::UnsupportedQueryType`]
    /// for anything but `A` and `NS`, and [`Error::DomainNotFound`] when the table has no
    /// domain for the queried name.
    pub fn answer(&self, queries: &[Query]) -> Result<Vec<Record>, Error> {
        let query = queries.first().ok_or(Error::NoQuestions)?;
        match query.query_type() {
            RecordType::A => self.answer_a(query),
            RecordType::NS => self.answer_ns(query),
            other => Err(Error::UnsupportedQueryType(other)),
        }
    }

    /// A single `A` record for the next address of the matching domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DomainNotFound`] when no domain matches.
    pub fn answer_a(&self, query: &Query) -> Result<Vec<Record>, Error> {
        let domain = self.lookup(query)?;
        let address = domain.get_address();
        debug!(domain = %domain.name, address, "answering A");
        Ok(keep_built(a_record(query.name(), address))
            .into_iter()
            .collect())
    }

    /// One `NS` record per nameserver of the matching domain, in configured order. A domain
    /// without nameservers yields no records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DomainNotFound`] when no domain matches.
    pub fn answer_ns(&self, query: &Query) -> Result<Vec<Record>, Error> {
        let domain = self.lookup(query)?;
        debug!(domain = %domain.name, nameservers = ?domain.nameservers, "answering NS");
        Ok(domain
            .nameservers
            .iter()
            .filter_map(|ns| keep_built(ns_record(query.name(), ns)))
            .collect())
    }

    fn lookup(&self, query: &Query) -> Result<Arc<Domain>, Error> {
        let key = lookup_key(query.name());
        self.table.find(&key).ok_or(Error::DomainNotFound(key))
    }
}

fn lookup_key(name: &Name) -> String {
    name.to_lowercase()
        .to_ascii()
        .trim_end_matches(SEPARATOR)
        .to_string()
}

fn a_record(owner: &Name, address: &str) -> Result<Record, Error> {
    let ip: Ipv4Addr = address
        .parse()
        .map_err(|err| Error::RecordConstruction(format!("\"{address}\": {err}")))?;
    Ok(Record::from_rdata(owner.clone(), ANSWER_TTL, RData::A(ip)))
}

fn ns_record(owner: &Name, nameserver: &str) -> Result<Record, Error> {
    let fqdn = if nameserver.ends_with(SEPARATOR) {
        Cow::Borrowed(nameserver)
    } else {
        Cow::Owned(format!("{nameserver}{SEPARATOR}"))
    };
    let ns = Name::from_ascii(&*fqdn)
        .map_err(|err| Error::RecordConstruction(format!("\"{nameserver}\": {err}")))?;
    Ok(Record::from_rdata(owner.clone(), ANSWER_TTL, RData::NS(ns)))
}

fn keep_built(record: Result<Record, Error>) -> Option<Record> {
    record
        .map_err(|err| error!(%err, "dropping answer record"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn resolver(domains: &[Domain]) -> Resolver {
        Resolver::new(Arc::new(SharedTable::new(domains).unwrap()))
    }

    fn query(name: &str, query_type: RecordType) -> Query {
        Query::query(Name::from_str(name).unwrap(), query_type)
    }

    fn ns(owner: &str, nameserver: &str) -> Record {
        Record::from_rdata(
            Name::from_str(owner).unwrap(),
            ANSWER_TTL,
            RData::NS(Name::from_str(nameserver).unwrap()),
        )
    }

    #[test]
    fn a_query_binds_query_name_to_address() {
        let resolver = resolver(&[Domain::new(
            "*.something.com",
            ["192.168.0.103"],
            Vec::<String>::new(),
        )]);
        let answers = resolver
            .answer(&[query("Test.Something.com.", RecordType::A)])
            .unwrap();
        assert_eq!(
            answers,
            [Record::from_rdata(
                Name::from_str("Test.Something.com.").unwrap(),
                ANSWER_TTL,
                RData::A(Ipv4Addr::new(192, 168, 0, 103)),
            )]
        );
    }

    #[test]
    fn ns_query_keeps_configured_order() {
        let resolver = resolver(&[Domain::new(
            "something.com",
            ["192.168.0.103"],
            ["ns2.something.com", "ns1.something.com."],
        )]);
        let answers = resolver
            .answer(&[query("something.com.", RecordType::NS)])
            .unwrap();
        assert_eq!(
            answers,
            [
                ns("something.com.", "ns2.something.com."),
                ns("something.com.", "ns1.something.com."),
            ]
        );
    }

    #[test]
    fn ns_query_without_nameservers_is_empty() {
        let resolver = resolver(&[Domain::new(
            "something.com",
            ["192.168.0.103"],
            Vec::<String>::new(),
        )]);
        let answers = resolver
            .answer(&[query("something.com.", RecordType::NS)])
            .unwrap();
        assert!(answers.is_empty());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let resolver = resolver(&[]);
        assert!(matches!(
            resolver.answer(&[query("else.nomatch.com.", RecordType::A)]),
            Err(Error::DomainNotFound(name)) if name == "else.nomatch.com"
        ));
    }

    #[test]
    fn root_name_is_not_found() {
        let resolver = resolver(&[Domain::new("*.", ["10.0.0.1"], Vec::<String>::new())]);
        assert!(matches!(
            resolver.answer(&[query(".", RecordType::A)]),
            Err(Error::DomainNotFound(_))
        ));
    }

    #[test]
    fn other_query_types_are_unsupported() {
        let resolver = resolver(&[Domain::new(
            "something.com",
            ["192.168.0.103"],
            Vec::<String>::new(),
        )]);
        assert!(matches!(
            resolver.answer(&[query("something.com.", RecordType::TXT)]),
            Err(Error::UnsupportedQueryType(RecordType::TXT))
        ));
    }

    #[test]
    fn no_questions_fails_fast() {
        let resolver = resolver(&[]);
        assert!(matches!(resolver.answer(&[]), Err(Error::NoQuestions)));
    }

    #[test]
    fn only_first_question_is_answered() {
        let resolver = resolver(&[Domain::new(
            "something.com",
            ["192.168.0.103"],
            Vec::<String>::new(),
        )]);
        let answers = resolver
            .answer(&[
                query("something.com.", RecordType::A),
                query("something.com.", RecordType::A),
            ])
            .unwrap();
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn unbuildable_records_are_dropped() {
        let resolver = resolver(&[Domain::new(
            "something.com",
            ["::1"],
            vec![
                "ns1.something.com".to_string(),
                "x".repeat(64),
                "ns2.something.com".to_string(),
            ],
        )]);
        let a = resolver
            .answer(&[query("something.com.", RecordType::A)])
            .unwrap();
        assert!(a.is_empty());

        let ns = resolver
            .answer(&[query("something.com.", RecordType::NS)])
            .unwrap();
        assert_eq!(ns.len(), 2);
    }
}

use sdns::resolver::ANSWER_TTL;
use sdns::{Dispatcher, Domain, SharedTable, UdpUpstream, Upstream};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use trust_dns_proto::op::{MessageType, OpCode, Query, ResponseCode};
use trust_dns_proto::rr::{Name, RData, Record, RecordType};

async fn spawn_server(domains: &[Domain], recursors: Vec<SocketAddr>) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let table = Arc::new(SharedTable::new(domains).unwrap());
    let dispatcher = Arc::new(Dispatcher::new(table, recursors, Arc::new(UdpUpstream)));
    let server = sdns::dns::server::with_socket(socket, dispatcher);
    tokio::spawn(server.block_until_done());
    addr
}

fn query(name: &str, query_type: RecordType) -> Query {
    Query::query(Name::from_str(name).unwrap(), query_type)
}

fn a(name: &str, ip: [u8; 4]) -> Record {
    Record::from_rdata(
        Name::from_str(name).unwrap(),
        ANSWER_TTL,
        RData::A(Ipv4Addr::from(ip)),
    )
}

#[tokio::test]
async fn test_a_query_over_udp() {
    let addr = spawn_server(
        &[Domain::new(
            "*.something.com",
            ["192.168.0.103"],
            ["us1.sdns.io"],
        )],
        vec![],
    )
    .await;

    let reply = UdpUpstream
        .forward(addr, &query("test.something.com.", RecordType::A))
        .await
        .unwrap();

    assert_eq!(reply.message_type(), MessageType::Response);
    assert_eq!(reply.op_code(), OpCode::Query);
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert!(!reply.recursion_available());
    assert_eq!(reply.answers(), [a("test.something.com.", [192, 168, 0, 103])]);
}

#[tokio::test]
async fn test_ns_query_over_udp() {
    let addr = spawn_server(
        &[Domain::new(
            "something.com",
            ["192.168.0.103"],
            ["us1.sdns.io", "us2.sdns.io"],
        )],
        vec![],
    )
    .await;

    let reply = UdpUpstream
        .forward(addr, &query("something.com.", RecordType::NS))
        .await
        .unwrap();

    let owner = Name::from_str("something.com.").unwrap();
    assert_eq!(
        reply.answers(),
        [
            Record::from_rdata(
                owner.clone(),
                ANSWER_TTL,
                RData::NS(Name::from_str("us1.sdns.io.").unwrap())
            ),
            Record::from_rdata(
                owner,
                ANSWER_TTL,
                RData::NS(Name::from_str("us2.sdns.io.").unwrap())
            ),
        ]
    );
}

#[tokio::test]
async fn test_unanswerable_query_gets_empty_reply() {
    let addr = spawn_server(&[], vec![]).await;

    let reply = UdpUpstream
        .forward(addr, &query("something.com.", RecordType::TXT))
        .await
        .unwrap();

    assert_eq!(reply.message_type(), MessageType::Response);
    assert!(reply.answers().is_empty());
}

#[tokio::test]
async fn test_miss_is_forwarded_to_recursor() {
    let authority = spawn_server(
        &[Domain::new(
            "else.nomatch.com",
            ["93.184.216.34"],
            Vec::<String>::new(),
        )],
        vec![],
    )
    .await;
    let forwarder = spawn_server(
        &[Domain::new("something.com", ["192.168.0.103"], Vec::<String>::new())],
        vec![authority],
    )
    .await;

    let reply = UdpUpstream
        .forward(forwarder, &query("else.nomatch.com.", RecordType::A))
        .await
        .unwrap();

    assert!(reply.recursion_available());
    assert_eq!(reply.answers(), [a("else.nomatch.com.", [93, 184, 216, 34])]);
}

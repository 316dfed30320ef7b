use crate::dns::Dispatcher;
use crate::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info_span, Instrument};
use trust_dns_proto::op::{Header, ResponseCode};
use trust_dns_server::authority::MessageResponseBuilder;
use trust_dns_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

#[derive(Clone)]
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    request_ids: Arc<AtomicU64>,
}

impl Handler {
    pub(super) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Handler {
            dispatcher,
            request_ids: Arc::default(),
        }
    }

    /// Server-assigned id correlating the log lines of one request. Unlike the DNS message id
    /// it is never reused by clients.
    fn next_request_id(&self) -> u64 {
        self.request_ids.fetch_add(1, Ordering::Relaxed)
    }

    async fn dispatch_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        // The server loop answers messages without exactly one question with FORMERR.
        let queries = [request.query().original().clone()];
        let answers = self.dispatcher.dispatch(request.op_code(), &queries).await;

        let mut header = Header::response_from_request(request.header());
        header.set_recursion_available(self.dispatcher.recursion_available());
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(header, answers.iter(), &[], &[], &[]);
        Ok(response_handle.send_response(response).await?)
    }
}

#[async_trait::async_trait]
impl RequestHandler for Handler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        let span = info_span!(
            "query",
            id = self.next_request_id(),
            msg_id = request.id(),
            src = %request.src()
        );
        match self
            .dispatch_request(request, response_handle)
            .instrument(span)
            .await
        {
            Ok(info) => info,
            Err(error) => {
                error!("error in RequestHandler: {:?}", error);
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}

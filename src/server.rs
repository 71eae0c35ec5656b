//! HTTP/1.1 server built on hyper and tokio.
//!
//! [`HttpServer`] owns the application handler plus any middleware and
//! serves each accepted connection on its own task.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use crate::error::{Error, Result};
use crate::http::{Handler, Middleware, MiddlewareChain, Request, Response};

/// HTTP server that dispatches requests to a [`Handler`] through an
/// optional middleware chain.
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	middlewares: Vec<Arc<dyn Middleware>>,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
		}
	}

	/// Add a middleware using the builder pattern
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	fn build_handler(&self) -> Arc<dyn Handler> {
		if self.middlewares.is_empty() {
			self.handler.clone()
		} else {
			let mut chain = MiddlewareChain::new(self.handler.clone());
			for middleware in &self.middlewares {
				chain.add_middleware(middleware.clone());
			}
			Arc::new(chain)
		}
	}

	/// Bind the address and serve connections until the process exits.
	///
	/// # Errors
	///
	/// Returns an error if the listener cannot bind or accepting fails.
	pub async fn listen(&self, addr: SocketAddr) -> Result<()> {
		let listener = TcpListener::bind(addr)
			.await
			.map_err(|e| Error::Internal(format!("Failed to bind {}: {}", addr, e)))?;
		tracing::info!(%addr, "listening on http://{}", addr);

		let handler = self.build_handler();

		loop {
			let (stream, remote_addr) = listener
				.accept()
				.await
				.map_err(|e| Error::Internal(format!("Failed to accept connection: {}", e)))?;
			let handler = handler.clone();

			tokio::task::spawn(async move {
				if let Err(err) = Self::handle_connection(stream, remote_addr, handler).await {
					tracing::error!(%remote_addr, error = %err, "error serving connection");
				}
			});
		}
	}

	async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn Handler>,
	) -> Result<()> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr,
		};

		http1::Builder::new()
			.serve_connection(io, service)
			.await
			.map_err(|e| Error::Internal(format!("Connection error: {}", e)))?;

		Ok(())
	}
}

/// Bridges hyper's request/response types to ours.
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl RequestService {
	async fn convert_request(
		req: hyper::Request<Incoming>,
		remote_addr: SocketAddr,
	) -> Result<Request> {
		let (parts, body) = req.into_parts();
		let body_bytes = body
			.collect()
			.await
			.map_err(|e| Error::Validation(format!("Failed to read request body: {}", e)))?
			.to_bytes();

		let mut request =
			Request::new(parts.method, parts.uri, parts.version, parts.headers, body_bytes);
		request.remote_addr = Some(remote_addr);
		Ok(request)
	}

	fn convert_response(response: Response) -> hyper::Response<Full<Bytes>> {
		let mut builder = hyper::Response::builder().status(response.status);
		for (name, value) in response.headers.iter() {
			builder = builder.header(name, value);
		}
		builder
			.body(Full::new(response.body))
			.unwrap_or_else(|_| hyper::Response::new(Full::new(Bytes::new())))
	}
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Infallible;
	type Future =
		Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let response = match Self::convert_request(req, remote_addr).await {
				Ok(request) => match handler.handle(request).await {
					Ok(response) => response,
					Err(err) => Response::from(err),
				},
				Err(err) => Response::from(err),
			};

			Ok(Self::convert_response(response))
		})
	}
}

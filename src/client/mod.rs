//! Endpoint catalogue over a pluggable transport.
//!
//! The client builds each request, hands it to a [`Transport`] and runs the
//! reply through [`classify`]. It owns no sockets and no credentials.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use url::Url;

use crate::account::GetPositionsResponse;
use crate::classify::{classify, CallKind, Outcome};
use crate::config::Config;
use crate::error::WireError;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::option_symbols::GetOptionSymbolsResponse;
use crate::order::request::{CancelOrderRequest, ModifyOrderRequest, PlaceOrderRequest};
use crate::order::response::{
    CancelOrderResponse, GetOrderResponse, GetOrdersResponse, ModifyOrderResponse, PlaceOrderResponse,
};
use crate::quote::GetQuotesResponse;
use crate::wire::{Decode, FormFields};

/// Row cap the filtered orders listing is asked for.
pub const ORDERS_LIMIT: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    /// Form-encoded body, sent with `FormFields::encode`.
    pub form: Option<FormFields>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends one request. Implementations attach auth and `Accept: application/json`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
    #[error(transparent)]
    Wire(#[from] WireError),
}

pub struct TradierClient<T> {
    transport: T,
    config: Config,
}

impl<T: Transport> TradierClient<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn account_url(&self, tail: &[&str]) -> Result<Url> {
        let mut segments = vec!["accounts", self.config.account_id.as_str()];
        segments.extend_from_slice(tail);
        self.config.endpoint(&segments)
    }

    async fn call<R: Decode>(
        &self,
        endpoint: &str,
        kind: CallKind,
        request: HttpRequest,
    ) -> Result<Outcome<R>, ClientError> {
        log(
            Level::Debug,
            Domain::Client,
            "client.request",
            obj(&[
                ("endpoint", v_str(endpoint)),
                ("method", v_str(request.method.as_str())),
                ("form_fields", v_num(request.form.as_ref().map_or(0, FormFields::len) as f64)),
            ]),
        );
        let response = self.transport.send(request).await?;
        log(
            Level::Debug,
            Domain::Client,
            "client.response",
            obj(&[
                ("endpoint", v_str(endpoint)),
                ("status", v_num(response.status as f64)),
                ("body_len", v_num(response.body.len() as f64)),
            ]),
        );
        Ok(classify(kind, response.status, &response.body)?)
    }

    pub async fn get_positions(&self) -> Result<Outcome<GetPositionsResponse>, ClientError> {
        let request = HttpRequest {
            method: Method::Get,
            url: self.account_url(&["positions"])?,
            form: None,
        };
        self.call("positions", CallKind::Read, request).await
    }

    pub async fn get_quotes(&self, symbols: &[&str]) -> Result<Outcome<GetQuotesResponse>, ClientError> {
        let mut form = FormFields::new();
        form.insert("symbols", symbols.join(","));
        let request = HttpRequest {
            method: Method::Post,
            url: self.config.endpoint(&["markets", "quotes"])?,
            form: Some(form),
        };
        self.call("quotes", CallKind::Read, request).await
    }

    /// All orders, or only those since `since` through the filtered listing.
    pub async fn get_orders(&self, since: Option<NaiveDate>) -> Result<Outcome<GetOrdersResponse>, ClientError> {
        let mut url = self.account_url(&["orders"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("includeTags", "true");
            if let Some(since) = since {
                query
                    .append_pair("start", &since.format("%Y-%m-%d").to_string())
                    .append_pair("limit", &ORDERS_LIMIT.to_string())
                    .append_pair("filter", "all");
            }
        }
        let request = HttpRequest {
            method: Method::Get,
            url,
            form: None,
        };
        self.call("orders", CallKind::Read, request).await
    }

    pub async fn get_order(&self, order_id: u64) -> Result<Outcome<GetOrderResponse>, ClientError> {
        let mut url = self.account_url(&["orders", order_id.to_string().as_str()])?;
        url.query_pairs_mut().append_pair("includeTags", "true");
        let request = HttpRequest {
            method: Method::Get,
            url,
            form: None,
        };
        self.call("order", CallKind::Read, request).await
    }

    /// Validates and encodes before sending; an invalid order never reaches the transport.
    pub async fn place_order(&self, order: &PlaceOrderRequest) -> Result<Outcome<PlaceOrderResponse>, ClientError> {
        let request = HttpRequest {
            method: Method::Post,
            url: self.account_url(&["orders"])?,
            form: Some(order.to_form()?),
        };
        self.call("place_order", CallKind::Read, request).await
    }

    pub async fn modify_order(&self, order: &ModifyOrderRequest) -> Result<Outcome<ModifyOrderResponse>, ClientError> {
        let request = HttpRequest {
            method: Method::Put,
            url: self.account_url(&["orders", order.order_id.as_str()])?,
            form: Some(order.to_form()?),
        };
        self.call("modify_order", CallKind::Mutation, request).await
    }

    pub async fn cancel_order(&self, order: &CancelOrderRequest) -> Result<Outcome<CancelOrderResponse>, ClientError> {
        let request = HttpRequest {
            method: Method::Delete,
            url: self.account_url(&["orders", order.order_id.as_str()])?,
            form: None,
        };
        self.call("cancel_order", CallKind::Mutation, request).await
    }

    pub async fn lookup_option_symbols(
        &self,
        underlying: &str,
    ) -> Result<Outcome<GetOptionSymbolsResponse>, ClientError> {
        let mut url = self.config.endpoint(&["markets", "options", "lookup"])?;
        url.query_pairs_mut().append_pair("underlying", underlying);
        let request = HttpRequest {
            method: Method::Get,
            url,
            form: None,
        };
        self.call("option_lookup", CallKind::Read, request).await
    }
}

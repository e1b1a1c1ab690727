//! The request-to-struct binding pipeline.
//!
//! Values are applied in six stages, each later stage overriding earlier
//! ones for fields that accept several channels:
//!
//! 1. `default` literals
//! 2. headers
//! 3. JSON body
//! 4. form body (url-encoded or multipart)
//! 5. query string
//! 6. route parameters
//!
//! The first stage that fails aborts the rest.

use crate::form::{self, FormKind};
use crate::{json, BindConfig, HttpError, Reflector, RequestView};
use bindery_core::{ParamSource, Params, TypeRegistry};
use tracing::{debug, trace};

/// Binds one request into parameter structs.
///
/// A binder is cheap to create and is usually built per request. The same
/// binder can fill several different parameter structs from one request.
#[derive(Debug)]
pub struct Binder<'a> {
    request: RequestView<'a>,
    types: &'a TypeRegistry,
    config: &'a BindConfig,
}

impl<'a> Binder<'a> {
    /// Creates a binder.
    pub fn new(request: RequestView<'a>, types: &'a TypeRegistry, config: &'a BindConfig) -> Self {
        Self {
            request,
            types,
            config,
        }
    }

    /// Runs every stage against `params`.
    ///
    /// # Panics
    ///
    /// Panics if a `default` literal does not parse into its field, or if
    /// a field of a custom type has no registered parser. Both are bugs in
    /// the parameter struct rather than bad input.
    pub fn bind_from_all<P: Params>(&self, params: &mut P) -> Result<(), HttpError> {
        let reflector = Reflector::for_type::<P>();
        self.set_from_defaults(params);
        self.set_from_headers(&reflector, params)?;
        self.check_body_size()?;
        self.set_from_json_body(params)?;
        self.set_from_form(&reflector, params)?;
        self.set_from_query(&reflector, params)?;
        self.set_from_path(&reflector, params)
    }

    fn set_from_defaults<P: Params>(&self, params: &mut P) {
        if let Err(err) = params.apply_defaults(self.types) {
            panic!("invalid default value, change the parameter struct: {err}");
        }
    }

    fn set_from_headers<P: Params>(
        &self,
        reflector: &Reflector,
        params: &mut P,
    ) -> Result<(), HttpError> {
        for (name, value) in self.request.headers() {
            let Ok(value) = value.to_str() else {
                trace!(header = %name, "skipping non-UTF-8 header value");
                continue;
            };
            self.offer(reflector, params, name.as_str(), value, ParamSource::Header)?;
        }
        Ok(())
    }

    fn check_body_size(&self) -> Result<(), HttpError> {
        let size = self.request.body().len();
        if size > self.config.max_body_size {
            debug!(size, max = self.config.max_body_size, "request body too large");
            return Err(HttpError::payload_too_large(self.config.max_body_size, size));
        }
        Ok(())
    }

    fn content_type(&self) -> Option<mime::Mime> {
        self.request
            .content_type()
            .and_then(|value| value.parse::<mime::Mime>().ok())
    }

    fn set_from_json_body<P: Params>(&self, params: &mut P) -> Result<(), HttpError> {
        if !self.request.has_body() {
            return Ok(());
        }
        match self.content_type() {
            Some(content_type) if json::is_json(&content_type) => {
                json::decode_into(params, self.request.body()).map_err(|err| {
                    debug!(error = %err, "failed to decode JSON body");
                    err
                })
            }
            Some(content_type) if FormKind::of(&content_type).is_some() => Ok(()),
            content_type => {
                debug!(
                    content_type = content_type.as_ref().map(mime::Mime::essence_str),
                    "unsupported request body"
                );
                Err(HttpError::unsupported_media_type())
            }
        }
    }

    fn set_from_form<P: Params>(
        &self,
        reflector: &Reflector,
        params: &mut P,
    ) -> Result<(), HttpError> {
        if !self.request.has_body() {
            return Ok(());
        }
        let Some(content_type) = self.content_type() else {
            return Ok(());
        };
        let pairs = match FormKind::of(&content_type) {
            Some(FormKind::UrlEncoded) => form::parse_urlencoded(self.request.body())?,
            Some(FormKind::Multipart) => form::parse_multipart(
                content_type.as_ref(),
                self.request.body().clone(),
                &self.config.multipart,
            )?,
            None => return Ok(()),
        };
        for (name, value) in &pairs {
            self.offer(reflector, params, name, value, ParamSource::Form)?;
        }
        Ok(())
    }

    fn set_from_query<P: Params>(
        &self,
        reflector: &Reflector,
        params: &mut P,
    ) -> Result<(), HttpError> {
        let Some(query) = self.request.query_string() else {
            return Ok(());
        };
        let pairs = form::parse_urlencoded(query.as_bytes())?;
        for (name, value) in &pairs {
            let name = if self.config.strip_array_suffix {
                form::strip_array_suffix(name)
            } else {
                name.as_str()
            };
            self.offer(reflector, params, name, value, ParamSource::Query)?;
        }
        Ok(())
    }

    fn set_from_path<P: Params>(
        &self,
        reflector: &Reflector,
        params: &mut P,
    ) -> Result<(), HttpError> {
        for (name, value) in self.request.route_params().iter() {
            self.offer(reflector, params, name, value, ParamSource::Path)?;
        }
        Ok(())
    }

    /// Offers one value to the field with wire name `name`.
    ///
    /// Unknown names, and fields that do not accept `channel`, are ignored.
    fn offer<P: Params>(
        &self,
        reflector: &Reflector,
        params: &mut P,
        name: &str,
        raw: &str,
        channel: ParamSource,
    ) -> Result<(), HttpError> {
        let Some(field) = reflector.param_field(name) else {
            trace!(param = name, source = %channel, "ignoring unbound parameter");
            return Ok(());
        };
        if !field.bindable || !field.can_set_from(channel) {
            trace!(
                param = name,
                source = %channel,
                declared = %field.source,
                "ignoring parameter from another source"
            );
            return Ok(());
        }
        reflector
            .set_field(params, field, raw, self.types)
            .map_err(|err| {
                debug!(param = name, source = %channel, error = %err, "failed to parse parameter");
                HttpError::bad_request(format!("{name}: {err}"))
            })
    }
}

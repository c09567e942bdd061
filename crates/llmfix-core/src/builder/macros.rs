//! Setter generators for the builder variants
//!
//! `honor_options!` stores the value in the field of the same name;
//! `ignore_options!` accepts and drops it.

macro_rules! honor_option {
    (base_url) => {
        fn base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = Some(base_url.into());
            self
        }
    };
    (api_key) => {
        fn api_key(mut self, api_key: impl Into<String>) -> Self {
            self.api_key = Some(api_key.into());
            self
        }
    };
    (custom_headers) => {
        fn custom_headers(
            mut self,
            custom_headers: ::std::collections::BTreeMap<String, String>,
        ) -> Self {
            self.custom_headers = Some(custom_headers);
            self
        }
    };
    (model_name) => {
        fn model_name(mut self, model_name: impl Into<String>) -> Self {
            self.model_name = Some(model_name.into());
            self
        }
    };
    (organization_id) => {
        fn organization_id(mut self, organization_id: impl Into<String>) -> Self {
            self.organization_id = Some(organization_id.into());
            self
        }
    };
    (timeout) => {
        fn timeout(mut self, timeout: ::std::time::Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }
    };
    (log_requests_responses) => {
        fn log_requests_responses(mut self, log_requests: bool, log_responses: bool) -> Self {
            self.log_requests = Some(log_requests);
            self.log_responses = Some(log_responses);
            self
        }
    };
    ($name:ident : $ty:ty) => {
        fn $name(mut self, $name: $ty) -> Self {
            self.$name = Some($name);
            self
        }
    };
}

macro_rules! ignore_option {
    (base_url) => {
        fn base_url(self, _base_url: impl Into<String>) -> Self {
            self
        }
    };
    (api_key) => {
        fn api_key(self, _api_key: impl Into<String>) -> Self {
            self
        }
    };
    (custom_headers) => {
        fn custom_headers(
            self,
            _custom_headers: ::std::collections::BTreeMap<String, String>,
        ) -> Self {
            self
        }
    };
    (organization_id) => {
        fn organization_id(self, _organization_id: impl Into<String>) -> Self {
            self
        }
    };
    ($name:ident : $ty:ty) => {
        fn $name(self, _value: $ty) -> Self {
            self
        }
    };
}

macro_rules! honor_options {
    ($($name:ident $(: $ty:ty)?),* $(,)?) => {
        $( honor_option!($name $(: $ty)?); )*
    };
}

macro_rules! ignore_options {
    ($($name:ident $(: $ty:ty)?),* $(,)?) => {
        $( ignore_option!($name $(: $ty)?); )*
    };
}

use lake_catalog_core::custom_resource::CustomResourceResponse;

pub trait ResponseSender {
    fn send_response(&self, response_url: &str, response: &CustomResourceResponse)
        -> Result<(), String>;
}

use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// HMAC signer for master key authorization. The decoded key only lives
/// inside the keyed MAC state.
#[derive(Clone)]
pub struct MasterKey {
    mac: HmacSha256,
}

impl MasterKey {
    pub fn from_base64(key: &str) -> Result<Self> {
        let raw = BASE64_STANDARD
            .decode(key.trim())
            .context("account key is not valid base64")?;
        let mac = HmacSha256::new_from_slice(&raw)
            .map_err(|err| anyhow!("account key rejected: {err}"))?;
        Ok(Self { mac })
    }

    pub fn authorization(
        &self,
        verb: &str,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> String {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());
        let token = format!("type=master&ver=1.0&sig={signature}");
        form_urlencoded::byte_serialize(token.as_bytes()).collect()
    }
}

pub fn rfc1123(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{MasterKey, rfc1123};

    const KEY: &str = "Y29zcWwtdGVzdC1tYXN0ZXIta2V5";
    const DATE: &str = "Tue, 01 Oct 2024 12:00:00 GMT";

    #[test]
    fn signs_query_requests_like_the_service_expects() {
        let key = MasterKey::from_base64(KEY).expect("key");
        let token = key.authorization("POST", "docs", "dbs/shop/colls/orders", DATE);
        assert_eq!(
            token,
            "type%3Dmaster%26ver%3D1.0%26sig%3D6LIaMTG2h1ilunjyLp43F28sk7Bc0KBJNIoC3jmQUfA%3D"
        );
    }

    #[test]
    fn signer_is_reusable() {
        let key = MasterKey::from_base64(KEY).expect("key");
        let first = key.authorization("post", "docs", "dbs/shop/colls/orders", DATE);
        let second = key.authorization("post", "docs", "dbs/shop/colls/orders", DATE);
        assert_eq!(first, second);
        assert_ne!(
            first,
            key.authorization("post", "docs", "dbs/shop/colls/returns", DATE)
        );
    }

    #[test]
    fn rejects_keys_that_are_not_base64() {
        let err = MasterKey::from_base64("not base64!").err().expect("error");
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn dates_use_rfc1123_in_gmt() {
        let at = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).single().expect("date");
        assert_eq!(rfc1123(at), DATE);
    }
}

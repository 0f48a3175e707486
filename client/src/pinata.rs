use mintsmith_interface::error::TokenOpError;
use serde::Deserialize;

const PINATA_API_BASE: &str = "https://api.pinata.cloud/pinning";
const PINATA_GATEWAY_BASE: &str = "https://gateway.pinata.cloud/ipfs";

/// Credentials for the pinning gateway.
#[derive(Debug, Clone)]
pub struct PinataCredentials {
    pub api_key: String,
    pub secret_key: String,
}

/// Content-addressed locators for a published image + metadata document pair.
///
/// Immutable once returned, and reusable across submission attempts: a failed
/// submission never requires a re-publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBundle {
    pub image_uri: String,
    pub metadata_uri: String,
}

/// Fields embedded in the off-chain metadata document.
#[derive(Debug, Clone)]
pub struct AssetMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub decimals: u8,
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

pub struct AssetPublisher {
    http: reqwest::Client,
    credentials: PinataCredentials,
}

impl AssetPublisher {
    pub fn new(credentials: PinataCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
        }
    }

    /// Uploads the image, then the JSON document referencing it.
    ///
    /// Either upload failing is a `PublishError` and nothing is retained
    /// locally. A failure after the first upload leaves the pinned image
    /// behind; content-addressed orphans are harmless and not rolled back.
    pub async fn publish(
        &self,
        file_name: &str,
        file_bytes: Vec<u8>,
        metadata: &AssetMetadata,
    ) -> anyhow::Result<AssetBundle> {
        if file_bytes.is_empty() {
            return Err(TokenOpError::Publish("no image file provided".to_string()).into());
        }

        let image_uri = self.pin_file(file_name, file_bytes).await?;
        let document = metadata_document(metadata, &image_uri);
        let metadata_uri = self.pin_json(&document).await?;

        Ok(AssetBundle {
            image_uri,
            metadata_uri,
        })
    }

    async fn pin_file(&self, file_name: &str, file_bytes: Vec<u8>) -> anyhow::Result<String> {
        let part = reqwest::multipart::Part::bytes(file_bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{PINATA_API_BASE}/pinFileToIPFS"))
            .header("pinata_api_key", &self.credentials.api_key)
            .header("pinata_secret_api_key", &self.credentials.secret_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TokenOpError::Publish(format!("image upload failed: {e}")))?;
        let pin = decode_pin_response(response, "image upload").await?;
        Ok(gateway_uri(&pin.ipfs_hash))
    }

    async fn pin_json(&self, document: &serde_json::Value) -> anyhow::Result<String> {
        let response = self
            .http
            .post(format!("{PINATA_API_BASE}/pinJSONToIPFS"))
            .header("pinata_api_key", &self.credentials.api_key)
            .header("pinata_secret_api_key", &self.credentials.secret_key)
            .json(document)
            .send()
            .await
            .map_err(|e| TokenOpError::Publish(format!("metadata upload failed: {e}")))?;
        let pin = decode_pin_response(response, "metadata upload").await?;
        Ok(gateway_uri(&pin.ipfs_hash))
    }
}

async fn decode_pin_response(
    response: reqwest::Response,
    step: &str,
) -> anyhow::Result<PinResponse> {
    let status = response.status();
    if !status.is_success() {
        return Err(TokenOpError::Publish(format!("{step} failed with status {status}")).into());
    }
    response
        .json()
        .await
        .map_err(|e| TokenOpError::Publish(format!("{step} returned an unreadable body: {e}")).into())
}

fn gateway_uri(ipfs_hash: &str) -> String {
    format!("{PINATA_GATEWAY_BASE}/{ipfs_hash}")
}

/// The JSON document pinned next to the image. Wallets and explorers read
/// `image` and the decimals attribute from here.
fn metadata_document(metadata: &AssetMetadata, image_uri: &str) -> serde_json::Value {
    serde_json::json!({
        "name": metadata.name,
        "symbol": metadata.symbol,
        "description": metadata.description,
        "image": image_uri,
        "attributes": [
            {
                "trait_type": "decimals",
                "value": metadata.decimals,
            }
        ],
    })
}

use anyhow::{anyhow, Result};
use keystore_api::client::KeystoreClient;
use keystore_validator::signature::public_key_for;
use keystore_validator::update_builder::UpdateBuilder;
use lazy_static::lazy_static;
use log::info;
use rand::Rng;
use state::commitment::{CommitmentScheme, Sha256Commitment};
use state::config::KeystoreConfig;
use state::keystore_record::{Address, Id, ValueHash};
use state::preimages::{Controller, MultisigController, Secp256k1Controller, ValueHashPreimages};

lazy_static! {
    static ref CONFIG: KeystoreConfig = KeystoreConfig::load().unwrap_or_default();
}

/// A secret key together with its compressed public key.
struct Signer {
    secret_key: [u8; 32],
    public_key: [u8; 33],
}

impl Signer {
    fn random() -> Signer {
        let mut rng = rand::thread_rng();
        loop {
            // Rejection sample until the bytes form a valid scalar
            let secret_key: [u8; 32] = rng.gen();
            if let Ok(public_key) = public_key_for(&secret_key) {
                return Signer { secret_key, public_key };
            }
        }
    }

    fn controller(&self) -> ValueHashPreimages {
        ValueHashPreimages::new(
            Controller::Secp256k1(Secp256k1Controller { public_key: self.public_key }),
            rand::thread_rng().gen(),
        )
    }
}

// Walks one record through genesis, a key rotation, a 2-of-3 multisig and back
// against a running keystore API.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let client = KeystoreClient::new(&CONFIG.api_url);
    if !client.health_check().await? {
        return Err(anyhow!("keystore API at {} is not healthy", client.base_url()));
    }

    let account = Address(rand::thread_rng().gen());
    let genesis_signer = Signer::random();
    let genesis = genesis_signer.controller();
    let id = Id(Sha256Commitment.value_hash(&genesis).0);
    info!("New keystore id {} for account {}", id, account);

    // Genesis: nothing stored yet, so the current value hash is the id itself
    let rotated_signer = Signer::random();
    let rotated = rotated_signer.controller();
    let update = UpdateBuilder::new(id, account, genesis, rotated.clone());
    let v1 = update.new_value_hash();
    let genesis_request = update.sign(&ValueHash::from(id), &genesis_signer.secret_key)?;
    let accepted = client.update(&genesis_request).await?;
    info!("Genesis update accepted: {:?}", accepted);

    let multisig_signers: Vec<Signer> = (0..3).map(|_| Signer::random()).collect();
    let multisig = ValueHashPreimages::new(
        Controller::Multisig(MultisigController {
            threshold: 2,
            public_keys: multisig_signers.iter().map(|signer| signer.public_key).collect(),
        }),
        rand::thread_rng().gen(),
    );
    let update = UpdateBuilder::new(id, account, rotated, multisig.clone());
    let v2 = update.new_value_hash();
    client.update(&update.sign(&v1, &rotated_signer.secret_key)?).await?;
    info!("Rotated to 2-of-3 multisig, value hash {}", v2);

    // Two of the three multisig keys hand control back to the genesis key
    let update = UpdateBuilder::new(id, account, multisig, genesis_signer.controller());
    let signers = [(0, multisig_signers[0].secret_key), (2, multisig_signers[2].secret_key)];
    client.update(&update.multisign(&v2, &signers)?).await?;
    info!("Recovered control with signers 0 and 2");

    let record = client.record(&id, &account).await?;
    info!("Stored record: {:?}", record);

    // Replaying the genesis update no longer matches the stored value hash
    match client.update(&genesis_request).await {
        Ok(accepted) => return Err(anyhow!("stale update was accepted: {:?}", accepted)),
        Err(err) => info!("Stale update refused as expected: {}", err),
    }

    let accounts = client.accounts(&id).await?;
    info!("Accounts under {}: {}", id, accounts.records.len());
    Ok(())
}

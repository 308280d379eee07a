//! The per-session blob back-channel: a plain owned map, not a global, so
//! its lifetime is bound to the session that created it.

use std::collections::HashMap;

use bridge_protocol::KvRequest;
use bridge_protocol::KvRequestKind;
use bridge_protocol::hex_blob_id;

#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: HashMap<String, bytes::Bytes>,
}

pub enum KvOutcome {
    Got(Option<bytes::Bytes>),
    Set,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, request: &KvRequest) -> KvOutcome {
        match &request.kind {
            KvRequestKind::Get(args) => {
                let key = hex_blob_id(&args.blob_id);
                KvOutcome::Got(self.blobs.get(&key).cloned())
            }
            KvRequestKind::Set(args) => {
                let key = hex_blob_id(&args.blob_id);
                self.blobs.insert(key, args.blob_data.clone());
                KvOutcome::Set
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_protocol::GetBlobArgs;
    use bridge_protocol::SetBlobArgs;

    #[test]
    fn get_after_set_returns_the_stored_bytes() {
        let mut store = BlobStore::new();
        let blob_id = bytes::Bytes::from_static(&[0xAB, 0xCD]);

        store.apply(&KvRequest {
            id: 1,
            kind: KvRequestKind::Set(SetBlobArgs {
                blob_id: blob_id.clone(),
                blob_data: bytes::Bytes::from_static(&[1, 2, 3]),
            }),
        });

        match store.apply(&KvRequest {
            id: 2,
            kind: KvRequestKind::Get(GetBlobArgs { blob_id }),
        }) {
            KvOutcome::Got(Some(data)) => assert_eq!(data.as_ref(), &[1, 2, 3]),
            _ => panic!("expected Got(Some(..))"),
        }
    }

    #[test]
    fn get_without_a_prior_set_is_absent() {
        let mut store = BlobStore::new();
        match store.apply(&KvRequest {
            id: 1,
            kind: KvRequestKind::Get(GetBlobArgs {
                blob_id: bytes::Bytes::from_static(&[0x01]),
            }),
        }) {
            KvOutcome::Got(None) => {}
            _ => panic!("expected absence"),
        }
    }
}

/// Byte encoding for messages sent to the chain.
///
/// The client never inspects a transaction's semantic fields: submitting one
/// only requires its byte encoding, which then flows through the middleware
/// chain (signing, ...) before broadcast.
pub trait Serializer {
    fn to_bytes(&self) -> Vec<u8>;

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn size(&self) -> usize {
        self.to_bytes().len()
    }
}

impl Serializer for Vec<u8> {
    fn to_bytes(&self) -> Vec<u8> {
        self.clone()
    }
}

impl Serializer for &[u8] {
    fn to_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        let bytes: Vec<u8> = vec![0xde, 0xad];
        assert_eq!(bytes.to_hex(), "dead");
        assert_eq!(bytes.size(), 2);
    }
}

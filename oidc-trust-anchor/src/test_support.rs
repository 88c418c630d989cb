use std::io::{self, Write};

use lazy_static::lazy_static;
use mockall::mock;
use rsa::{RsaPrivateKey, RsaPublicKey};

lazy_static! {
    pub static ref PRIVATE_KEY: RsaPrivateKey =
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
    pub static ref PUBLIC_KEY: RsaPublicKey = RsaPublicKey::from(&*PRIVATE_KEY);
    pub static ref ANOTHER_PUBLIC_KEY: RsaPublicKey =
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048)
            .unwrap()
            .to_public_key();
}

mock! {
    pub Sink {}

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

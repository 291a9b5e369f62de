//! # Verification Flows
//!
//! Card signing and verification through the real `reqwest` transport
//! against in-process key directories.
//!
//! ## Flows Tested:
//!
//! 1. **Sign → text → parse → verify**: a card survives its text form
//! 2. **Directory fallback**: unreachable and non-key directories are skipped
//! 3. **Publish → verify**: a published key becomes available for lookup
//! 4. **Negative verdicts**: uncertified, revoked, tampered, unknown

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use hqsl_card::Card;
    use hqsl_openpgp::{
        HqslOpenPgp, PublicKey, QslVerificationApi, ReqwestTransport, Verdict,
    };
    use sequoia_openpgp::packet::UserID;
    use sequoia_openpgp::serialize::SerializeInto;
    use sequoia_openpgp::Packet;

    use crate::fixtures::*;
    use crate::hkp::{Behavior, HkpServer};

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn verifier(keys: &TestKeys, servers: &[String]) -> HqslOpenPgp {
        HqslOpenPgp::setup([keys.root_armored()], servers, Some(TIMEOUT)).unwrap()
    }

    /// An address nothing listens on.
    async fn closed_port_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_signed_card_verifies_over_http() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);

        let verification = hqsl.verify(&keys.sign(contact())).await;
        assert_eq!(verification.verdict, Verdict::Valid);
        assert_eq!(verification.signer_key, Some(keys.signer_public()));
        assert_eq!(verification.certifier_key, Some(keys.root_public()));
    }

    #[tokio::test]
    async fn test_card_text_round_trip_keeps_signature_valid() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = verifier(&keys, &[server.hkp_url()]);

        let text = keys.sign(contact()).to_text().unwrap();
        let url = format!("https://hqsl.net/h#{text}");
        let parsed: Card = url.parse().unwrap();

        let verified = hqsl.verify_card(parsed).await;
        assert_eq!(verified.verdict(), Verdict::Valid);
        assert_eq!(verified.card.to_text().unwrap(), text);
    }

    #[tokio::test]
    async fn test_portable_operation_is_covered() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);

        let mut card = contact();
        card.from = Some("EA8/AC1PZ/P".into());
        let verification = hqsl.verify(&keys.sign(card)).await;
        assert_eq!(verification.verdict, Verdict::Valid);
    }

    #[tokio::test]
    async fn test_unreachable_and_non_key_directories_are_skipped() {
        let keys = TestKeys::certified().unwrap();
        let web_page = HkpServer::start_with(vec![keys.signer_public()], Behavior::WebPage)
            .await
            .unwrap();
        let empty = HkpServer::start(Vec::new()).await.unwrap();
        let good = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let servers = [
            closed_port_url().await,
            web_page.url(),
            empty.url(),
            good.url(),
        ];
        let hqsl = verifier(&keys, &servers);

        let verification = hqsl.verify(&keys.sign(contact())).await;
        assert_eq!(verification.verdict, Verdict::Valid);
    }

    #[tokio::test]
    async fn test_missing_key_is_key_not_found() {
        let keys = TestKeys::certified().unwrap();
        let empty = HkpServer::start(Vec::new()).await.unwrap();
        let hqsl = verifier(&keys, &[empty.url(), closed_port_url().await]);

        let verification = hqsl.verify(&keys.sign(contact())).await;
        assert_eq!(verification.verdict, Verdict::KeyNotFound);
        assert!(verification.signer_key.is_none());
    }

    #[tokio::test]
    async fn test_lookup_by_key_id() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);

        let found = hqsl
            .lookup(&format!("0x{}", keys.signer_public().key_id()))
            .await
            .unwrap();
        assert_eq!(found, vec![keys.signer_public()]);
        assert!(hqsl.lookup("0x0000000000000000").await.is_err());
    }

    #[tokio::test]
    async fn test_published_key_becomes_available() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(Vec::new()).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);
        let card = keys.sign(contact());

        assert_eq!(hqsl.verify(&card).await.verdict, Verdict::KeyNotFound);

        for handle in hqsl.publish(&keys.signer_public(), None).unwrap() {
            handle.await.unwrap();
        }
        assert_eq!(server.keys().await, vec![keys.signer_public()]);
        assert!(server.submissions().await[0].starts_with("-----BEGIN PGP PUBLIC KEY BLOCK-----"));

        assert_eq!(hqsl.verify(&card).await.verdict, Verdict::Valid);
    }

    #[tokio::test]
    async fn test_publish_to_explicit_target_only() {
        let keys = TestKeys::certified().unwrap();
        let configured = HkpServer::start(Vec::new()).await.unwrap();
        let target = HkpServer::start(Vec::new()).await.unwrap();
        let hqsl = verifier(&keys, &[configured.url()]);

        for handle in hqsl
            .publish(&keys.signer_public(), Some(&target.hkp_url()))
            .unwrap()
        {
            handle.await.unwrap();
        }
        assert_eq!(target.keys().await.len(), 1);
        assert!(configured.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_publication_failure_is_not_surfaced() {
        let keys = TestKeys::certified().unwrap();
        let hqsl = verifier(&keys, &[closed_port_url().await]);
        let handles = hqsl.publish(&keys.signer_public(), None).unwrap();
        for handle in handles {
            assert!(handle.await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_uncertified_key_is_not_certified() {
        let keys = TestKeys::with_notation(None).unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);

        let verification = hqsl.verify(&keys.sign(contact())).await;
        assert_eq!(verification.verdict, Verdict::KeyNotCertified);
        assert_eq!(verification.signer_key, Some(keys.signer_public()));
        assert!(verification.certifier_key.is_none());
    }

    #[tokio::test]
    async fn test_contact_before_window_is_not_certified() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);

        let mut card = contact();
        card.when = Some(utc(2023, 1, 1, 12, 0));
        let verification = hqsl.verify(&keys.sign(card)).await;
        assert_eq!(verification.verdict, Verdict::KeyNotCertified);
    }

    #[tokio::test]
    async fn test_revoked_signer_is_not_certified() {
        let keys = TestKeys::certified().unwrap();
        let revoked = keys.revoked_signer().unwrap();
        let server = HkpServer::start(vec![revoked]).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);

        let verification = hqsl.verify(&keys.sign(contact())).await;
        assert_eq!(verification.verdict, Verdict::KeyNotCertified);
        assert!(hqsl
            .certification_ranges(verification.signer_key.as_ref().unwrap())
            .is_empty());
    }

    #[tokio::test]
    async fn test_trailing_packet_is_invalid() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);

        let mut card = keys.sign(contact());
        let trailer = Packet::from(UserID::from("trailer")).to_vec().unwrap();
        if let Some(sig) = card.signature.as_mut() {
            sig.extend(trailer);
        }
        assert_eq!(hqsl.verify(&card).await.verdict, Verdict::Invalid);
    }

    #[tokio::test]
    async fn test_altered_contact_is_invalid() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = verifier(&keys, &[server.url()]);

        let mut card = keys.sign(contact());
        card.freq = Some(14.074);
        assert_eq!(hqsl.verify(&card).await.verdict, Verdict::Invalid);
    }

    #[tokio::test]
    async fn test_unsigned_card_needs_no_directory() {
        let keys = TestKeys::certified().unwrap();
        let hqsl = verifier(&keys, &[closed_port_url().await]);
        let verification = hqsl.verify(&contact()).await;
        assert_eq!(verification.verdict, Verdict::NotSigned);
    }

    #[tokio::test]
    async fn test_concurrent_verifications_share_one_verifier() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let hqsl = Arc::new(verifier(&keys, &[server.url()]));

        let cards = [
            keys.sign(contact()),
            contact(),
            {
                let mut card = contact();
                card.from = Some("W1KOT".into());
                keys.sign(card)
            },
        ];
        let tasks: Vec<_> = cards
            .into_iter()
            .map(|card| {
                let hqsl = Arc::clone(&hqsl);
                tokio::spawn(async move { hqsl.verify(&card).await.verdict })
            })
            .collect();

        let mut verdicts = Vec::new();
        for task in tasks {
            verdicts.push(task.await.unwrap());
        }
        assert_eq!(
            verdicts,
            vec![Verdict::Valid, Verdict::NotSigned, Verdict::KeyNotCertified]
        );
    }

    #[tokio::test]
    async fn test_custom_transport_client() {
        let keys = TestKeys::certified().unwrap();
        let server = HkpServer::start(vec![keys.signer_public()]).await.unwrap();
        let client = reqwest::Client::builder()
            .user_agent("hqsl-tests")
            .build()
            .unwrap();
        let transport = ReqwestTransport::with_client(client);
        let hqsl = HqslOpenPgp::with_transport(
            Arc::new(transport),
            vec![PublicKey::from_cert(keys.root.clone())],
            &[server.url()],
            TIMEOUT,
        )
        .unwrap();

        let verification = hqsl.verify(&keys.sign(contact())).await;
        assert_eq!(verification.verdict, Verdict::Valid);
    }
}

/*!
# Swarm DevKit - Stubs et Utilitaires de Test

Bibliothèque facilitant les tests du monitor avec:
- Faux pool HTTP (statut + webhook) sans réseau externe
- Mailer mock sans relais SMTP
- Builders de documents de statut pool
*/

pub mod fixtures;
pub mod mailer_stub;
pub mod pool_stub;
pub mod test_utils;

pub use fixtures::{Layout, WorkerDocBuilder};
pub use mailer_stub::MockMailer;
pub use pool_stub::StubPool;
pub use test_utils::TestHarness;

/*!
Fixtures de documents de statut pool

Construit des documents JSON dans les différents formats observés
(liste ou map de workers, clés variables) pour les tests.
*/

use serde_json::{Map, Value};

/// Format du conteneur de workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `"workers": [ {...}, {...} ]`
    List,
    /// `"workers_info": { "acct.rig1": {...}, ... }`
    Map,
}

/// Builder de document de statut
#[derive(Debug, Clone)]
pub struct WorkerDocBuilder {
    list_key: String,
    layout: Layout,
    name_key: String,
    hashrate_key: String,
    workers: Vec<Value>,
    extra: Map<String, Value>,
}

impl WorkerDocBuilder {
    pub fn new() -> Self {
        Self {
            list_key: "workers_info".to_string(),
            layout: Layout::List,
            name_key: "workername".to_string(),
            hashrate_key: "hashrate1m".to_string(),
            workers: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Format ckpool solo : `worker` en liste, hashrates avec suffixe
    pub fn ckpool() -> Self {
        Self::new().list_key("worker")
    }

    pub fn list_key(mut self, key: &str) -> Self {
        self.list_key = key.to_string();
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn name_key(mut self, key: &str) -> Self {
        self.name_key = key.to_string();
        self
    }

    pub fn hashrate_key(mut self, key: &str) -> Self {
        self.hashrate_key = key.to_string();
        self
    }

    /// Ajoute un worker avec son nom complet et son hashrate brut
    pub fn worker(mut self, name: &str, hashrate: impl Into<Value>) -> Self {
        let mut record = Map::new();
        record.insert(self.name_key.clone(), Value::String(name.to_string()));
        record.insert(self.hashrate_key.clone(), hashrate.into());
        self.workers.push(Value::Object(record));
        self
    }

    /// Worker actif (1.26 TH/s)
    pub fn online(self, name: &str) -> Self {
        self.worker(name, "1.26T")
    }

    /// Worker à l'arrêt
    pub fn offline(self, name: &str) -> Self {
        self.worker(name, "0")
    }

    /// Ajoute un enregistrement brut, tel quel
    pub fn record(mut self, record: Value) -> Self {
        self.workers.push(record);
        self
    }

    /// Champ racine additionnel (ex: "hashrate1m" global du compte)
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Value {
        let container = match self.layout {
            Layout::List => Value::Array(self.workers),
            Layout::Map => {
                let mut map = Map::new();
                for (i, record) in self.workers.into_iter().enumerate() {
                    let key = record
                        .get(&self.name_key)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("worker-{i}"));
                    map.insert(key, record);
                }
                Value::Object(map)
            }
        };

        let mut doc = self.extra;
        doc.insert(self.list_key, container);
        Value::Object(doc)
    }
}

impl Default for WorkerDocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

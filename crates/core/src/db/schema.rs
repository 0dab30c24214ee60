//! SQLite schema definition.

/// Complete database schema for suprident.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Clinics
-- ============================================================================

CREATE TABLE IF NOT EXISTS clinicas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sindicato TEXT,
    endereco TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Professionals
-- ============================================================================

CREATE TABLE IF NOT EXISTS profissionais (
    id TEXT PRIMARY KEY,
    nome TEXT NOT NULL,
    funcao TEXT,
    email TEXT,
    telefone TEXT,
    login TEXT UNIQUE,
    senha TEXT,
    role TEXT NOT NULL DEFAULT 'professional',
    id_clinica INTEGER REFERENCES clinicas(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_profissionais_clinica ON profissionais(id_clinica);

-- ============================================================================
-- Materials Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS materiais (
    id TEXT PRIMARY KEY,
    nome TEXT NOT NULL,
    tipo TEXT,
    preco INTEGER NOT NULL DEFAULT 0 CHECK (preco >= 0),  -- centavos
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_materiais_nome ON materiais(nome);

-- ============================================================================
-- Monthly Request Lists
-- ============================================================================

CREATE TABLE IF NOT EXISTS listas (
    id TEXT PRIMARY KEY,
    profissional_id TEXT NOT NULL REFERENCES profissionais(id),
    clinica_id INTEGER NOT NULL REFERENCES clinicas(id),
    status TEXT NOT NULL DEFAULT 'not_filled'
        CHECK (status IN ('not_filled', 'filled', 'delivered')),
    month TEXT,                                           -- YYYY-MM
    descricao TEXT,
    preco_total INTEGER,                                  -- centavos, set at fill time
    delivery_confirmation_id TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    filled_at TEXT,
    delivered_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_listas_clinica_status ON listas(clinica_id, status);
CREATE INDEX IF NOT EXISTS idx_listas_profissional ON listas(profissional_id);
CREATE INDEX IF NOT EXISTS idx_listas_month ON listas(month);

-- ============================================================================
-- List Line Items (immutable after fill, except the missing flag)
-- ============================================================================

CREATE TABLE IF NOT EXISTS lista_materiais_itens (
    id TEXT PRIMARY KEY,
    lista_id TEXT NOT NULL REFERENCES listas(id),
    material_id TEXT NOT NULL REFERENCES materiais(id),
    quantidade INTEGER NOT NULL CHECK (quantidade >= 1),
    preco INTEGER NOT NULL CHECK (preco >= 0),            -- snapshot at fill time
    observacoes TEXT,
    missing INTEGER NOT NULL DEFAULT 0,
    missing_reported_by TEXT,
    missing_reported_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_itens_lista ON lista_materiais_itens(lista_id);
CREATE INDEX IF NOT EXISTS idx_itens_material ON lista_materiais_itens(material_id);

-- ============================================================================
-- Delivery Confirmations (immutable evidence records)
-- ============================================================================

CREATE TABLE IF NOT EXISTS delivery_confirmations (
    id TEXT PRIMARY KEY,
    lista_id TEXT REFERENCES listas(id),
    clinica_id INTEGER REFERENCES clinicas(id),
    photo_url TEXT NOT NULL,
    signature_url TEXT,
    observations TEXT,
    confirmed_by TEXT,
    confirmed_at TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    -- Exactly one target: a single list or a whole clinic
    CHECK ((lista_id IS NULL) <> (clinica_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_confirmations_lista ON delivery_confirmations(lista_id);
CREATE INDEX IF NOT EXISTS idx_confirmations_clinica ON delivery_confirmations(clinica_id);

-- ============================================================================
-- Sessions
-- ============================================================================

CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    profissional_id TEXT NOT NULL REFERENCES profissionais(id),
    role TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_profissional ON sessions(profissional_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn lista_status_is_constrained() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute("INSERT INTO clinicas (sindicato) VALUES ('Sindicato A')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO profissionais (id, nome, id_clinica) VALUES ('p1', 'Ana', 1)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO listas (id, profissional_id, clinica_id, status)
             VALUES ('l1', 'p1', 1, 'shipped')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO listas (id, profissional_id, clinica_id) VALUES ('l1', 'p1', 1)",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn confirmation_requires_exactly_one_target() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute("INSERT INTO clinicas (sindicato) VALUES ('Sindicato A')", [])
            .unwrap();

        // Neither target set should fail
        let result = conn.execute(
            "INSERT INTO delivery_confirmations (id, photo_url, confirmed_at)
             VALUES ('c1', 'u', datetime('now'))",
            [],
        );
        assert!(result.is_err());

        // Clinic target alone should succeed
        let result = conn.execute(
            "INSERT INTO delivery_confirmations (id, clinica_id, photo_url, confirmed_at)
             VALUES ('c1', 1, 'u', datetime('now'))",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn quantidade_must_be_positive() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute("INSERT INTO clinicas (sindicato) VALUES ('S')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO profissionais (id, nome, id_clinica) VALUES ('p1', 'Ana', 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO listas (id, profissional_id, clinica_id) VALUES ('l1', 'p1', 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO materiais (id, nome, preco) VALUES ('m1', 'Luvas', 1500)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO lista_materiais_itens (id, lista_id, material_id, quantidade, preco)
             VALUES ('i1', 'l1', 'm1', 0, 1500)",
            [],
        );
        assert!(result.is_err());
    }
}

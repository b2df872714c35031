pub mod ingest; // CSV reconciliation ingest

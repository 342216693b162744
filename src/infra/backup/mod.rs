pub mod csv_backup;

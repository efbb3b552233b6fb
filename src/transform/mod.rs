//! Whole-file encryption and decryption
//!
//! `FileTransform` drives one operation through its stages:
//!
//! - encrypt: validating, reading, deriving key, encrypting, writing,
//!   removing original
//! - decrypt: validating, reading, splitting container, deriving key,
//!   decrypting, writing, removing original
//!
//! The source is only deleted after the output has been synced to disk.
//! The start and outcome of every operation go to the injected `AuditSink`;
//! failures name the stage they happened in.

pub mod file_io;

use std::fmt;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::audit::{AuditEntry, AuditSink, Operation};
use crate::config::settings::{Settings, DEFAULT_DECRYPTED_FILE_NAME};
use crate::crypto::container::{random_nonce, random_salt};
use crate::crypto::{
    derivation_for, Container, KeyDerivation, KeyDerivationParams, Password, Scheme,
};
use crate::error::{FilecryptError, FilecryptResult};

/// Suffix appended to the source stem for encrypted output
pub const ENCRYPTED_SUFFIX: &str = "_encrypted.txt";

/// Stages of a transform, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Reading,
    SplittingContainer,
    Deriving,
    Encrypting,
    Decrypting,
    Writing,
    RemovingOriginal,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Reading => "reading",
            Stage::SplittingContainer => "splitting container",
            Stage::Deriving => "deriving key",
            Stage::Encrypting => "encrypting",
            Stage::Decrypting => "decrypting",
            Stage::Writing => "writing",
            Stage::RemovingOriginal => "removing original",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Options shared by both directions
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Scheme for the container layout and cipher
    pub scheme: Scheme,
    /// Argon2id costs (sealed scheme)
    pub kdf: KeyDerivationParams,
    /// Name of the decrypted file, in the input's directory
    pub decrypted_file_name: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            kdf: KeyDerivationParams::default(),
            decrypted_file_name: DEFAULT_DECRYPTED_FILE_NAME.to_string(),
        }
    }
}

impl From<&Settings> for TransformOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            scheme: settings.scheme,
            kdf: settings.kdf,
            decrypted_file_name: settings.decrypted_file_name.clone(),
        }
    }
}

/// Summary of a completed transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformReport {
    pub operation: Operation,
    /// File that was read (and removed)
    pub input: PathBuf,
    /// File that was written
    pub output: PathBuf,
    pub bytes_read: usize,
    pub bytes_written: usize,
}

/// Encrypts or decrypts a single file in place of the original
pub struct FileTransform<'a> {
    options: TransformOptions,
    audit: &'a dyn AuditSink,
}

impl<'a> FileTransform<'a> {
    /// Create a transform logging to `audit`
    pub fn new(options: TransformOptions, audit: &'a dyn AuditSink) -> Self {
        Self { options, audit }
    }

    /// Encrypt `path` to `<stem>_encrypted.txt` and delete `path`
    pub fn encrypt(&self, path: &Path, password: &Password) -> FilecryptResult<TransformReport> {
        self.run(Operation::Encrypt, path, |stage| {
            self.encrypt_stages(path, password, stage)
        })
    }

    /// Decrypt `path` to the configured file name and delete `path`
    pub fn decrypt(&self, path: &Path, password: &Password) -> FilecryptResult<TransformReport> {
        self.run(Operation::Decrypt, path, |stage| {
            self.decrypt_stages(path, password, stage)
        })
    }

    fn run<F>(
        &self,
        operation: Operation,
        path: &Path,
        stages: F,
    ) -> FilecryptResult<TransformReport>
    where
        F: FnOnce(&mut Stage) -> FilecryptResult<TransformReport>,
    {
        let mut stage = Stage::Validating;
        match stages(&mut stage) {
            Ok(report) => {
                self.audit.record(&AuditEntry::succeeded_message(
                    operation,
                    path,
                    &report.output,
                ));
                Ok(report)
            }
            Err(err) => {
                self.audit
                    .record(&AuditEntry::failed_message(operation, stage, &err));
                Err(err)
            }
        }
    }

    fn encrypt_stages(
        &self,
        path: &Path,
        password: &Password,
        stage: &mut Stage,
    ) -> FilecryptResult<TransformReport> {
        let scheme = self.options.scheme;

        *stage = Stage::Validating;
        file_io::ensure_source_file(path)?;
        let output = encrypted_output_path(path)?;
        self.audit
            .record(&AuditEntry::started_message(Operation::Encrypt, path));

        *stage = Stage::Reading;
        let plaintext = Zeroizing::new(file_io::read_file(path)?);

        *stage = Stage::Deriving;
        let nonce = random_nonce();
        let salt = scheme.uses_salt().then(random_salt);
        let key = match &salt {
            Some(salt) => KeyDerivation::Argon2id {
                salt,
                params: &self.options.kdf,
            },
            None => KeyDerivation::Digest,
        }
        .derive(password)?;

        *stage = Stage::Encrypting;
        let ciphertext = scheme.encrypt(&key, &nonce, &plaintext)?;
        let container = match salt {
            Some(salt) => Container::with_salt(nonce, salt, ciphertext),
            None => Container::new(nonce, ciphertext),
        };
        let encoded = container.encode();

        self.commit(path, &output, &encoded, stage)?;

        *stage = Stage::Done;
        Ok(TransformReport {
            operation: Operation::Encrypt,
            input: path.to_path_buf(),
            output,
            bytes_read: plaintext.len(),
            bytes_written: encoded.len(),
        })
    }

    fn decrypt_stages(
        &self,
        path: &Path,
        password: &Password,
        stage: &mut Stage,
    ) -> FilecryptResult<TransformReport> {
        let scheme = self.options.scheme;

        *stage = Stage::Validating;
        file_io::ensure_source_file(path)?;
        let output = decrypted_output_path(path, &self.options.decrypted_file_name)?;
        self.audit
            .record(&AuditEntry::started_message(Operation::Decrypt, path));

        *stage = Stage::Reading;
        let encoded = file_io::read_file(path)?;

        *stage = Stage::SplittingContainer;
        let container = Container::decode(&encoded, scheme)?;

        *stage = Stage::Deriving;
        let key = derivation_for(&container, &self.options.kdf).derive(password)?;

        *stage = Stage::Decrypting;
        let plaintext = Zeroizing::new(scheme.decrypt(
            &key,
            &container.nonce,
            &container.ciphertext,
        )?);

        self.commit(path, &output, &plaintext, stage)?;

        *stage = Stage::Done;
        Ok(TransformReport {
            operation: Operation::Decrypt,
            input: path.to_path_buf(),
            output,
            bytes_read: encoded.len(),
            bytes_written: plaintext.len(),
        })
    }

    /// Write the output durably, then delete the source
    ///
    /// A source that already carries the output name was replaced in place
    /// and is kept.
    fn commit(
        &self,
        path: &Path,
        output: &Path,
        data: &[u8],
        stage: &mut Stage,
    ) -> FilecryptResult<()> {
        *stage = Stage::Writing;
        file_io::write_atomic(output, data)?;

        *stage = Stage::RemovingOriginal;
        if output != path {
            file_io::remove_original(path, output)?;
        }
        Ok(())
    }
}

/// `<dir>/<stem>_encrypted.txt` for a source path
pub fn encrypted_output_path(path: &Path) -> FilecryptResult<PathBuf> {
    let stem = path
        .file_stem()
        .ok_or_else(|| FilecryptError::FileNotFound(path.to_path_buf()))?;

    let mut name = stem.to_os_string();
    name.push(ENCRYPTED_SUFFIX);

    Ok(sibling(path, name))
}

/// `<dir>/<name>` for an encrypted source path
pub fn decrypted_output_path(path: &Path, name: &str) -> FilecryptResult<PathBuf> {
    crate::config::settings::validate_file_name(name)?;
    Ok(sibling(path, name))
}

fn sibling(path: &Path, name: impl AsRef<std::ffi::OsStr>) -> PathBuf {
    match path.parent() {
        Some(dir) => dir.join(name.as_ref()),
        None => PathBuf::from(name.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{MemoryAuditLog, NullAuditLog};
    use std::fs;
    use tempfile::TempDir;

    fn sealed_options() -> TransformOptions {
        TransformOptions {
            scheme: Scheme::Sealed,
            kdf: KeyDerivationParams::with_values(1024, 1, 1),
            ..TransformOptions::default()
        }
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_output_paths() {
        assert_eq!(
            encrypted_output_path(Path::new("dir/notes.md")).unwrap(),
            PathBuf::from("dir/notes_encrypted.txt")
        );
        assert_eq!(
            encrypted_output_path(Path::new("archive.tar.gz")).unwrap(),
            PathBuf::from("archive.tar_encrypted.txt")
        );
        assert_eq!(
            encrypted_output_path(Path::new(".bashrc")).unwrap(),
            PathBuf::from(".bashrc_encrypted.txt")
        );
        assert_eq!(
            decrypted_output_path(Path::new("dir/notes_encrypted.txt"), "test.txt").unwrap(),
            PathBuf::from("dir/test.txt")
        );
        assert!(decrypted_output_path(Path::new("a"), "../escape.txt").is_err());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::SplittingContainer.to_string(), "splitting container");
        assert_eq!(Stage::RemovingOriginal.to_string(), "removing original");
    }

    #[test]
    fn test_encrypt_then_decrypt_legacy() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.md");
        fs::write(&source, b"hello world").unwrap();

        let audit = MemoryAuditLog::new();
        let transform = FileTransform::new(TransformOptions::default(), &audit);
        let password = Password::new("hunter2");

        let report = transform.encrypt(&source, &password).unwrap();
        assert_eq!(report.output, temp.path().join("notes_encrypted.txt"));
        assert_eq!(report.bytes_read, 11);
        assert_eq!(report.bytes_written, 32);
        assert!(!source.exists());
        assert_eq!(dir_entries(temp.path()), vec!["notes_encrypted.txt"]);

        let report = transform.decrypt(&report.output, &password).unwrap();
        assert_eq!(report.output, temp.path().join("test.txt"));
        assert_eq!(fs::read(&report.output).unwrap(), b"hello world");
        assert_eq!(dir_entries(temp.path()), vec!["test.txt"]);

        let messages = audit.messages();
        assert_eq!(messages.len(), 4);
        assert!(messages[0].starts_with("Started encrypting file"));
        assert!(messages[1].starts_with("Encrypted file"));
        assert!(messages[2].starts_with("Started decrypting file"));
        assert!(messages[3].starts_with("Decrypted file"));
    }

    #[test]
    fn test_empty_file_round_trip() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("empty.txt");
        fs::write(&source, b"").unwrap();

        let transform = FileTransform::new(TransformOptions::default(), &NullAuditLog);
        let password = Password::new("hunter2");

        let encrypted = transform.encrypt(&source, &password).unwrap();
        assert_eq!(fs::metadata(&encrypted.output).unwrap().len(), 32);

        let decrypted = transform.decrypt(&encrypted.output, &password).unwrap();
        assert_eq!(fs::metadata(&decrypted.output).unwrap().len(), 0);
    }

    #[test]
    fn test_encrypt_then_decrypt_sealed() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("data.bin");
        let payload: Vec<u8> = (0..5000).map(|i| (i * 7 % 251) as u8).collect();
        fs::write(&source, &payload).unwrap();

        let transform = FileTransform::new(sealed_options(), &NullAuditLog);
        let password = Password::new("correct horse");

        let encrypted = transform.encrypt(&source, &password).unwrap();
        assert_eq!(encrypted.bytes_written, 16 + 16 + payload.len() + 16);

        let decrypted = transform.decrypt(&encrypted.output, &password).unwrap();
        assert_eq!(fs::read(&decrypted.output).unwrap(), payload);
    }

    #[test]
    fn test_encrypt_missing_source_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let audit = MemoryAuditLog::new();
        let transform = FileTransform::new(TransformOptions::default(), &audit);

        let result = transform.encrypt(&temp.path().join("missing.txt"), &Password::new("pw"));

        assert!(matches!(result, Err(FilecryptError::FileNotFound(_))));
        assert!(dir_entries(temp.path()).is_empty());

        let messages = audit.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0]
            .starts_with("Error while encrypting file (validating): File not found"));
    }

    #[test]
    fn test_decrypt_missing_source() {
        let temp = TempDir::new().unwrap();
        let transform = FileTransform::new(TransformOptions::default(), &NullAuditLog);

        let result = transform.decrypt(&temp.path().join("missing.txt"), &Password::new("pw"));
        assert!(matches!(result, Err(FilecryptError::FileNotFound(_))));
    }

    #[test]
    fn test_decrypt_short_file_is_malformed() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("short_encrypted.txt");
        fs::write(&source, [0u8; 15]).unwrap();

        let audit = MemoryAuditLog::new();
        let transform = FileTransform::new(TransformOptions::default(), &audit);
        let result = transform.decrypt(&source, &Password::new("pw"));

        assert!(matches!(
            result,
            Err(FilecryptError::MalformedContainer { expected: 16, actual: 15 })
        ));
        assert!(source.exists());
        assert!(audit.messages()[1].contains("(splitting container)"));
    }

    #[test]
    fn test_legacy_wrong_password_keeps_encrypted_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("hello_encrypted.txt");

        // "hello world" under "pw1" with IV 00..0f
        let mut container: Vec<u8> = (0u8..16).collect();
        container.extend_from_slice(&[
            0x4a, 0x91, 0x3f, 0x28, 0x30, 0x3e, 0xeb, 0x46, 0x2a, 0x5f, 0x5b, 0x9f, 0xa7, 0x58,
            0xac, 0xe5,
        ]);
        fs::write(&source, &container).unwrap();

        let audit = MemoryAuditLog::new();
        let transform = FileTransform::new(TransformOptions::default(), &audit);

        let result = transform.decrypt(&source, &Password::new("pw2"));
        assert!(matches!(result, Err(FilecryptError::WrongPasswordOrCorrupted)));
        assert_eq!(fs::read(&source).unwrap(), container);
        assert!(!temp.path().join("test.txt").exists());
        assert_eq!(
            audit.messages()[1],
            "Error while decrypting file (decrypting): Wrong password or corrupted data"
        );

        let report = transform.decrypt(&source, &Password::new("pw1")).unwrap();
        assert_eq!(fs::read(report.output).unwrap(), b"hello world");
    }

    #[test]
    fn test_sealed_wrong_password_keeps_encrypted_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("hello.txt");
        fs::write(&source, b"hello world").unwrap();

        let transform = FileTransform::new(sealed_options(), &NullAuditLog);
        let encrypted = transform.encrypt(&source, &Password::new("pw1")).unwrap();

        let result = transform.decrypt(&encrypted.output, &Password::new("pw2"));
        assert!(result.unwrap_err().is_wrong_password());
        assert!(encrypted.output.exists());
        assert!(!temp.path().join("test.txt").exists());
    }

    #[test]
    fn test_second_decrypt_overwrites_first_output() {
        let temp = TempDir::new().unwrap();
        let transform = FileTransform::new(TransformOptions::default(), &NullAuditLog);
        let password = Password::new("pw");

        for (name, body) in [("a.txt", &b"first"[..]), ("b.txt", &b"second"[..])] {
            let source = temp.path().join(name);
            fs::write(&source, body).unwrap();
            let encrypted = transform.encrypt(&source, &password).unwrap();
            transform.decrypt(&encrypted.output, &password).unwrap();
        }

        assert_eq!(fs::read(temp.path().join("test.txt")).unwrap(), b"second");
        assert_eq!(dir_entries(temp.path()), vec!["test.txt"]);
    }

    #[test]
    fn test_custom_decrypted_name() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("report.csv");
        fs::write(&source, b"a,b\n1,2\n").unwrap();

        let options = TransformOptions {
            decrypted_file_name: "report.csv".to_string(),
            ..TransformOptions::default()
        };
        let transform = FileTransform::new(options, &NullAuditLog);
        let password = Password::new("pw");

        let encrypted = transform.encrypt(&source, &password).unwrap();
        let decrypted = transform.decrypt(&encrypted.output, &password).unwrap();

        assert_eq!(decrypted.output, source);
        assert_eq!(fs::read(&source).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_decrypt_in_place_when_names_collide() {
        let temp = TempDir::new().unwrap();
        let original = temp.path().join("plain.txt");
        fs::write(&original, b"collide").unwrap();

        let transform = FileTransform::new(TransformOptions::default(), &NullAuditLog);
        let password = Password::new("pw");
        let encrypted = transform.encrypt(&original, &password).unwrap();

        let input = temp.path().join("test.txt");
        fs::rename(&encrypted.output, &input).unwrap();

        let report = transform.decrypt(&input, &password).unwrap();
        assert_eq!(report.output, input);
        assert_eq!(fs::read(&input).unwrap(), b"collide");
    }

    #[test]
    fn test_decrypt_input_named_like_a_temp_file() {
        let temp = TempDir::new().unwrap();
        let original = temp.path().join("payload.txt");
        fs::write(&original, b"payload").unwrap();

        let transform = FileTransform::new(TransformOptions::default(), &NullAuditLog);
        let password = Password::new("pw");
        let encrypted = transform.encrypt(&original, &password).unwrap();

        let input = temp.path().join("test.txt.tmp");
        fs::rename(&encrypted.output, &input).unwrap();

        let report = transform.decrypt(&input, &password).unwrap();
        assert_eq!(fs::read(&report.output).unwrap(), b"payload");
        assert_eq!(dir_entries(temp.path()), vec!["test.txt"]);
    }

    #[test]
    fn test_decrypt_leaves_unrelated_tmp_file_alone() {
        let temp = TempDir::new().unwrap();
        let bystander = temp.path().join("test.txt.tmp");
        fs::write(&bystander, b"not ours").unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, b"secret").unwrap();

        let transform = FileTransform::new(TransformOptions::default(), &NullAuditLog);
        let password = Password::new("pw");
        let encrypted = transform.encrypt(&source, &password).unwrap();
        transform.decrypt(&encrypted.output, &password).unwrap();

        assert_eq!(fs::read(&bystander).unwrap(), b"not ours");
        assert_eq!(fs::read(temp.path().join("test.txt")).unwrap(), b"secret");
        assert_eq!(dir_entries(temp.path()), vec!["test.txt", "test.txt.tmp"]);
    }

    #[test]
    fn test_original_not_removed_keeps_output_and_logs() {
        let temp = TempDir::new().unwrap();
        // Already gone by the time removal runs
        let source = temp.path().join("vanished.txt");
        let output = temp.path().join("vanished_encrypted.txt");

        let audit = MemoryAuditLog::new();
        let transform = FileTransform::new(TransformOptions::default(), &audit);

        let result = transform.run(Operation::Encrypt, &source, |stage| {
            transform.commit(&source, &output, b"container", stage)?;
            Ok(TransformReport {
                operation: Operation::Encrypt,
                input: source.clone(),
                output: output.clone(),
                bytes_read: 0,
                bytes_written: 9,
            })
        });

        match result {
            Err(FilecryptError::OriginalNotRemoved {
                original,
                output: written,
                ..
            }) => {
                assert_eq!(original, source);
                assert_eq!(written, output);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(fs::read(&output).unwrap(), b"container");

        let messages = audit.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Error while encrypting file (removing original): Wrote"));
        assert!(messages[0].contains("failed to remove original"));
    }

    #[test]
    fn test_sealed_empty_file_container_size() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("empty.txt");
        fs::write(&source, b"").unwrap();

        let transform = FileTransform::new(sealed_options(), &NullAuditLog);
        let encrypted = transform.encrypt(&source, &Password::new("pw")).unwrap();

        assert_eq!(encrypted.bytes_written, 48);
    }

    #[test]
    fn test_two_encryptions_differ() {
        for options in [TransformOptions::default(), sealed_options()] {
            let temp = TempDir::new().unwrap();
            let transform = FileTransform::new(options, &NullAuditLog);
            let password = Password::new("pw");

            let mut containers = Vec::new();
            for name in ["one.txt", "two.txt"] {
                let source = temp.path().join(name);
                fs::write(&source, b"same input").unwrap();
                let report = transform.encrypt(&source, &password).unwrap();
                containers.push(fs::read(report.output).unwrap());
            }

            assert_ne!(containers[0], containers[1]);
            assert_ne!(&containers[0][..16], &containers[1][..16]);
        }
    }

    #[test]
    fn test_sealed_tampered_salt_fails() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("hello.txt");
        fs::write(&source, b"hello world").unwrap();

        let transform = FileTransform::new(sealed_options(), &NullAuditLog);
        let password = Password::new("pw");
        let encrypted = transform.encrypt(&source, &password).unwrap();

        let mut bytes = fs::read(&encrypted.output).unwrap();
        bytes[20] ^= 0x80;
        fs::write(&encrypted.output, &bytes).unwrap();

        let result = transform.decrypt(&encrypted.output, &password);
        assert!(result.unwrap_err().is_wrong_password());
        assert_eq!(fs::read(&encrypted.output).unwrap(), bytes);
    }
}

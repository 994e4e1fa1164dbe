//! Resource pack assembly.
//!
//! Lays out the pack tree in a scratch directory, zips it, and only then
//! moves the archive into its final location, so a crash mid-assembly never
//! leaves a partial artifact where the download path could find it.

pub mod templates;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::resolver::types::ResolvedSkin;
use templates::PACK_NAMESPACE;

/// File name of the packaged archive inside each job's artifact directory.
pub const ARCHIVE_NAME: &str = "skin_pack.zip";

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot assemble a pack with no skins")]
    EmptyBatch,
}

/// Builds skin-pack archives under an artifacts root directory.
pub struct PackAssembler {
    artifacts_root: PathBuf,
    item: String,
}

impl PackAssembler {
    /// `item` is the vanilla item whose model the pack overrides.
    pub fn new(artifacts_root: PathBuf, item: String) -> Self {
        Self {
            artifacts_root,
            item,
        }
    }

    /// Final archive location for a job.
    pub fn artifact_path(&self, job_id: &str) -> PathBuf {
        self.artifacts_root.join(job_id).join(ARCHIVE_NAME)
    }

    /// Delete a job's artifact directory if it exists.
    pub fn remove_artifact(&self, job_id: &str) -> Result<(), AssemblerError> {
        let dir = self.artifacts_root.join(job_id);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            debug!("removed artifact directory: {}", dir.display());
        }
        Ok(())
    }

    /// Assemble and package the pack for a job, returning the archive path.
    pub fn assemble(
        &self,
        job_id: &str,
        skins: &[ResolvedSkin],
    ) -> Result<PathBuf, AssemblerError> {
        if skins.is_empty() {
            return Err(AssemblerError::EmptyBatch);
        }

        fs::create_dir_all(&self.artifacts_root)?;

        // Scratch lives under the artifacts root so the final rename stays
        // on one filesystem.
        let scratch = tempfile::tempdir_in(&self.artifacts_root)?;
        let pack_dir = scratch.path().join("pack");

        self.write_pack_tree(&pack_dir, skins)?;

        let staged_zip = scratch.path().join(ARCHIVE_NAME);
        zip_directory(&pack_dir, &staged_zip)?;

        let final_path = self.artifact_path(job_id);
        fs::create_dir_all(self.artifacts_root.join(job_id))?;
        fs::rename(&staged_zip, &final_path)?;

        info!(
            "assembled pack: job_id={} skins={} path={}",
            job_id,
            skins.len(),
            final_path.display()
        );

        Ok(final_path)
    }

    fn write_pack_tree(&self, pack_dir: &Path, skins: &[ResolvedSkin]) -> Result<(), AssemblerError> {
        let textures_dir = pack_dir
            .join("assets")
            .join(PACK_NAMESPACE)
            .join("textures")
            .join("item");
        let models_dir = pack_dir
            .join("assets")
            .join(PACK_NAMESPACE)
            .join("models")
            .join("item");
        let items_dir = pack_dir.join("assets").join("minecraft").join("items");

        fs::create_dir_all(&textures_dir)?;
        fs::create_dir_all(&models_dir)?;
        fs::create_dir_all(&items_dir)?;

        fs::write(
            pack_dir.join("pack.mcmeta"),
            serde_json::to_vec_pretty(&templates::pack_mcmeta())?,
        )?;

        for skin in skins {
            // File names are resource-location paths, which must be lowercase
            let file_name = skin.name.to_lowercase();
            fs::write(textures_dir.join(format!("{}.png", file_name)), &skin.texture)?;
            fs::write(
                models_dir.join(format!("{}.json", file_name)),
                serde_json::to_vec_pretty(&templates::model_definition(&skin.name, skin.variant))?,
            )?;
        }

        let names: Vec<String> = skins.iter().map(|s| s.name.clone()).collect();
        fs::write(
            items_dir.join(format!("{}.json", self.item)),
            serde_json::to_vec_pretty(&templates::item_index(&names, &self.item))?,
        )?;

        Ok(())
    }
}

/// Zip a directory tree, with entry names relative to `dir`.
fn zip_directory(dir: &Path, zip_path: &Path) -> Result<(), AssemblerError> {
    let file = File::create(zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_directory(&mut writer, dir, dir, options)?;

    writer.finish()?;
    Ok(())
}

fn add_directory(
    writer: &mut ZipWriter<File>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<(), AssemblerError> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            add_directory(writer, root, &path, options)?;
        } else {
            let name = path
                .strip_prefix(root)
                .map_err(|_| io::Error::other("zip entry escaped the walked root"))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            writer.start_file(name, options)?;
            let mut source = File::open(&path)?;
            io::copy(&mut source, writer)?;
        }
    }

    Ok(())
}

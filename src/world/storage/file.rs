use crate::utils::error::StorageError;
use crate::world::chunk::Chunk;
use crate::world::chunk_coord::{ChunkCoord, ChunkDims};
use crate::world::storage::core::{ChunkStore, SerializedChunk};
use bincode::{deserialize_from, serialize_into};
use log::debug;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One bincode file per chunk, named `chunk_{x}_{y}_{z}.bin`, under a base directory.
pub struct FileChunkStore {
    base_path: PathBuf,
}

impl FileChunkStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn chunk_path(&self, coord: ChunkCoord) -> PathBuf {
        self.base_path.join(coord.to_path())
    }

    /// Coordinates of every chunk file in the directory.
    pub fn stored_chunks(&self) -> Result<Vec<ChunkCoord>, StorageError> {
        let mut coords = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if let Ok(coord) = ChunkCoord::from_path(&path) {
                coords.push(coord);
            }
        }
        coords.sort();
        Ok(coords)
    }
}

impl ChunkStore for FileChunkStore {
    fn has_chunk(&self, coord: ChunkCoord) -> bool {
        self.chunk_path(coord).is_file()
    }

    fn load_chunk(&self, coord: ChunkCoord, dims: ChunkDims) -> Result<Option<Chunk>, StorageError> {
        let path = self.chunk_path(coord);
        if !path.is_file() {
            return Ok(None);
        }

        let reader = BufReader::new(File::open(&path)?);
        let serialized: SerializedChunk = deserialize_from(reader)?;
        if serialized.coord != coord {
            return Err(StorageError::CoordinateMismatch {
                expected: coord,
                found: serialized.coord,
            });
        }
        serialized.into_chunk(dims).map(Some)
    }

    fn save_chunk(&self, chunk: &Chunk) -> Result<(), StorageError> {
        let serialized = SerializedChunk::from_chunk(chunk)?;
        let path = self.chunk_path(chunk.coord());
        // write beside the target, then rename over it
        let staging = path.with_extension("bin.tmp");
        {
            let mut writer = BufWriter::new(File::create(&staging)?);
            serialize_into(&mut writer, &serialized)?;
            writer.flush()?;
        }
        fs::rename(&staging, &path)?;
        debug!("Saved chunk {:?} to {}", chunk.coord(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::voxel::Voxel;
    use crate::world::voxel_type::VoxelTypeId;
    use glam::UVec3;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileChunkStore::new(dir.path().join("chunks")).unwrap();
        let dims = ChunkDims::new(4, 8);
        let coord = ChunkCoord::new(1, 0, -2);

        assert!(!store.has_chunk(coord));
        assert!(store.load_chunk(coord, dims).unwrap().is_none());

        let mut chunk = Chunk::new(coord, dims);
        chunk.set_voxel(UVec3::new(3, 7, 3), Voxel::new(VoxelTypeId::GLASS));
        chunk.set_voxel(UVec3::new(0, 0, 0), Voxel::new(VoxelTypeId::SAND));
        store.save_chunk(&chunk).unwrap();

        assert!(store.has_chunk(coord));
        assert!(store.base_path().join("chunk_1_0_-2.bin").is_file());
        let loaded = store.load_chunk(coord, dims).unwrap().unwrap();
        assert_eq!(loaded.occupied().count(), 2);
        assert_eq!(loaded.voxel(UVec3::new(3, 7, 3)).unwrap().kind, VoxelTypeId::GLASS);
        assert_eq!(store.stored_chunks().unwrap(), vec![coord]);
    }

    #[test]
    fn test_renamed_file_reports_coordinate_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileChunkStore::new(dir.path()).unwrap();
        let dims = ChunkDims::new(2, 2);
        store.save_chunk(&Chunk::new(ChunkCoord::new(0, 0, 0), dims)).unwrap();
        fs::rename(dir.path().join("chunk_0_0_0.bin"), dir.path().join("chunk_5_0_0.bin")).unwrap();

        let result = store.load_chunk(ChunkCoord::new(5, 0, 0), dims);
        assert!(matches!(result, Err(StorageError::CoordinateMismatch { .. })));
    }

    #[test]
    fn test_corrupt_file_reports_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileChunkStore::new(dir.path()).unwrap();
        fs::write(dir.path().join("chunk_0_0_0.bin"), [1u8, 2, 3]).unwrap();

        let result = store.load_chunk(ChunkCoord::new(0, 0, 0), ChunkDims::new(2, 2));
        assert!(matches!(result, Err(StorageError::Encoding(_))));
    }
}

use crate::riot::client::RiotClient;
use crate::riot::region::Region;
use crate::riot::types::{RiotApiResponse, SummonerDto};

pub(crate) fn summoner_by_name_path(display_name: &str) -> String {
    format!(
        "/lol/summoner/v4/summoners/by-name/{}",
        urlencoding::encode(display_name)
    )
}

impl RiotClient {
    /// Get summoner by display name
    /// Uses platform routing (euw1, eun1, kr, etc.)
    pub async fn get_summoner_by_name(
        &self,
        region: Region,
        display_name: &str,
    ) -> RiotApiResponse<SummonerDto> {
        let url = format!(
            "{}{}",
            self.platform_url(region),
            summoner_by_name_path(display_name)
        );

        self.get(&url).await
    }

    /// Get summoner by encrypted summoner id
    pub async fn get_summoner_by_id(
        &self,
        region: Region,
        summoner_id: &str,
    ) -> RiotApiResponse<SummonerDto> {
        let url = format!(
            "{}/lol/summoner/v4/summoners/{}",
            self.platform_url(region),
            urlencoding::encode(summoner_id)
        );

        self.get(&url).await
    }
}
